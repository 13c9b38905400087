use axum::{extract::State, response::IntoResponse, routing::get};
use serde::Deserialize;
use validator::Validate;

use crate::{
	extract::{Admin, Json, Session},
	model, AppState, Database,
};

pub fn routes() -> axum::Router<AppState> {
	axum::Router::new().route("/", get(get_resources).post(create_resource))
}

#[derive(Deserialize, Validate)]
pub struct CreateResourceInput {
	#[validate(length(min = 1, max = 128))]
	pub title: String,
	#[validate(length(min = 1))]
	pub description: String,
	pub r#type: model::ResourceType,
	#[validate(url)]
	pub url: String,
}

/// Returns all curated resources, newest first.
async fn get_resources(
	State(database): State<Database>,
	_session: Session,
) -> Result<impl IntoResponse, crate::Error> {
	let resources = sqlx::query_as::<_, model::Resource>(
		r#"
			SELECT * FROM resource
			ORDER BY created_at DESC
		"#,
	)
	.fetch_all(&database)
	.await?;

	Ok(Json(resources))
}

/// Publishes a new curated resource. Admin only.
async fn create_resource(
	State(database): State<Database>,
	_admin: Admin,
	Json(input): Json<CreateResourceInput>,
) -> Result<impl IntoResponse, crate::Error> {
	let resource = sqlx::query_as::<_, model::Resource>(
		r#"
			INSERT INTO resource (title, description, type, url)
			VALUES ($1, $2, $3, $4)
			RETURNING *
		"#,
	)
	.bind(&input.title)
	.bind(&input.description)
	.bind(input.r#type)
	.bind(&input.url)
	.fetch_one(&database)
	.await?;

	Ok(Json(resource))
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[sqlx::test]
	async fn test_create_requires_admin(pool: Database) {
		let app = app(pool);
		register(&app, "june").await;

		let response = app
			.post("/resources")
			.json(&json!({
				"title": "Grounding techniques",
				"description": "A short guide to grounding exercises.",
				"type": "pdf",
				"url": "https://example.com/grounding.pdf",
			}))
			.await;

		assert_eq!(response.status_code(), 403);
	}

	#[sqlx::test]
	async fn test_admin_creates_resource(pool: Database) {
		let app = app(pool.clone());
		register_admin(&app, &pool, "ava").await;

		let response = app
			.post("/resources")
			.json(&json!({
				"title": "Grounding techniques",
				"description": "A short guide to grounding exercises.",
				"type": "pdf",
				"url": "https://example.com/grounding.pdf",
			}))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<serde_json::Value>()["type"], "pdf");

		let resources = app.get("/resources").await.json::<serde_json::Value>();

		assert_eq!(resources.as_array().unwrap().len(), 1);
	}

	#[sqlx::test]
	async fn test_rejects_unknown_type(pool: Database) {
		let app = app(pool.clone());
		register_admin(&app, &pool, "ava").await;

		let response = app
			.post("/resources")
			.json(&json!({
				"title": "Mixtape",
				"description": "Calming sounds.",
				"type": "cassette",
				"url": "https://example.com/mixtape",
			}))
			.await;

		assert_eq!(response.status_code(), 400);
	}
}
