use axum::{extract::State, response::IntoResponse, routing::get};
use serde::Deserialize;
use validator::Validate;

use crate::{
	extract::{Json, Session},
	model, AppState, Database,
};

pub fn routes() -> axum::Router<AppState> {
	axum::Router::new().route("/", get(get_moods).post(create_mood))
}

#[derive(Deserialize, Validate)]
pub struct CreateMoodInput {
	/// One of the five discrete mood levels offered by the tracker.
	#[validate(range(min = 0, max = 4))]
	pub rating: i32,
	pub note: Option<String>,
}

/// Records a mood entry for the authenticated user.
async fn create_mood(
	State(database): State<Database>,
	session: Session,
	Json(input): Json<CreateMoodInput>,
) -> Result<impl IntoResponse, crate::Error> {
	let mood = sqlx::query_as::<_, model::Mood>(
		r#"
			INSERT INTO mood (user_id, rating, note)
			VALUES ($1, $2, $3)
			RETURNING *
		"#,
	)
	.bind(session.user.id)
	.bind(input.rating)
	.bind(&input.note)
	.fetch_one(&database)
	.await?;

	Ok(Json(mood))
}

/// Returns the authenticated user's mood history, newest first.
///
/// Strictly scoped to the requesting user.
async fn get_moods(
	State(database): State<Database>,
	session: Session,
) -> Result<impl IntoResponse, crate::Error> {
	let moods = sqlx::query_as::<_, model::Mood>(
		r#"
			SELECT * FROM mood
			WHERE user_id = $1
			ORDER BY created_at DESC
		"#,
	)
	.bind(session.user.id)
	.fetch_all(&database)
	.await?;

	Ok(Json(moods))
}
