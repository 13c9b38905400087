use axum::{
	extract::{Path, State},
	response::IntoResponse,
	routing::{delete, get},
};
use uuid::Uuid;

use crate::{
	aggregate,
	extract::{Admin, Json},
	model, AppState, Database,
};

pub fn routes() -> axum::Router<AppState> {
	axum::Router::new()
		.route("/users", get(get_users))
		.route("/users/:id", delete(delete_user))
		.route("/resources/:id", delete(delete_resource))
		.route("/mood-stats", get(mood_stats))
}

/// Returns every registered user, oldest first.
async fn get_users(
	State(database): State<Database>,
	_admin: Admin,
) -> Result<impl IntoResponse, crate::Error> {
	let users = sqlx::query_as::<_, model::User>(
		r#"
			SELECT * FROM "user"
			ORDER BY created_at
		"#,
	)
	.fetch_all(&database)
	.await?;

	Ok(Json(users))
}

/// Deletes a user along with their moods, posts, comments and likes.
async fn delete_user(
	State(database): State<Database>,
	_admin: Admin,
	Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, crate::Error> {
	sqlx::query(r#"DELETE FROM "user" WHERE id = $1"#)
		.bind(user_id)
		.execute(&database)
		.await?;

	Ok(())
}

/// Deletes a curated resource.
async fn delete_resource(
	State(database): State<Database>,
	_admin: Admin,
	Path(resource_id): Path<Uuid>,
) -> Result<impl IntoResponse, crate::Error> {
	sqlx::query("DELETE FROM resource WHERE id = $1")
		.bind(resource_id)
		.execute(&database)
		.await?;

	Ok(())
}

/// Returns aggregate mood statistics across all users.
async fn mood_stats(
	State(database): State<Database>,
	_admin: Admin,
) -> Result<impl IntoResponse, crate::Error> {
	let ratings = sqlx::query_scalar::<_, i32>("SELECT rating FROM mood")
		.fetch_all(&database)
		.await?;

	Ok(Json(aggregate::mood_stats(&ratings)))
}
