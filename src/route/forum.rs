use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::IntoResponse,
	routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
	aggregate,
	extract::{Json, Session},
	model, AppState, Database,
};

pub fn routes() -> axum::Router<AppState> {
	axum::Router::new()
		.route("/posts", get(get_posts).post(create_post))
		.route(
			"/posts/:id/comments",
			get(get_comments).post(create_comment),
		)
		.route("/posts/:id/like", post(toggle_like))
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(Uuid),
}

impl Error {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) => StatusCode::NOT_FOUND,
		}
	}
}

#[derive(Deserialize, Validate)]
pub struct CreatePostInput {
	#[validate(length(min = 1, max = 128))]
	pub title: String,
	#[validate(length(min = 1))]
	pub content: String,
}

#[derive(Deserialize, Validate)]
pub struct CreateCommentInput {
	#[validate(length(min = 1))]
	pub content: String,
}

/// Creates a new forum post.
async fn create_post(
	State(database): State<Database>,
	session: Session,
	Json(input): Json<CreatePostInput>,
) -> Result<impl IntoResponse, crate::Error> {
	let post = sqlx::query_as::<_, model::Post>(
		r#"
			INSERT INTO post (user_id, title, content)
			VALUES ($1, $2, $3)
			RETURNING *
		"#,
	)
	.bind(session.user.id)
	.bind(&input.title)
	.bind(&input.content)
	.fetch_one(&database)
	.await?;

	Ok(Json(post))
}

/// Returns all posts, newest first, each augmented with its like count and
/// whether the requesting user has liked it.
async fn get_posts(
	State(database): State<Database>,
	session: Session,
) -> Result<impl IntoResponse, crate::Error> {
	let posts = fetch_posts(&database, session.user.id).await?;

	Ok(Json(posts))
}

/// One aggregation pass counts likes grouped by post, a second collects the
/// posts the current user has liked; both merge into the base list.
async fn fetch_posts(
	database: &Database,
	current_user_id: Uuid,
) -> Result<Vec<model::PostWithLikes>, sqlx::Error> {
	let posts = sqlx::query_as::<_, model::Post>(
		r#"
			SELECT * FROM post
			ORDER BY created_at DESC
		"#,
	)
	.fetch_all(database)
	.await?;

	let counts = sqlx::query_as::<_, (Uuid, i64)>(
		r#"
			SELECT post_id, count(*) FROM "like"
			GROUP BY post_id
		"#,
	)
	.fetch_all(database)
	.await?;

	let liked = sqlx::query_scalar::<_, Uuid>(r#"SELECT post_id FROM "like" WHERE user_id = $1"#)
		.bind(current_user_id)
		.fetch_all(database)
		.await?;

	Ok(aggregate::with_like_info(posts, counts, liked))
}

/// Adds a comment to a post.
async fn create_comment(
	State(database): State<Database>,
	session: Session,
	Path(post_id): Path<Uuid>,
	Json(input): Json<CreateCommentInput>,
) -> Result<impl IntoResponse, crate::Error> {
	let comment = sqlx::query_as::<_, model::Comment>(
		r#"
			INSERT INTO comment (user_id, post_id, content)
			VALUES ($1, $2, $3)
			RETURNING *
		"#,
	)
	.bind(session.user.id)
	.bind(post_id)
	.bind(&input.content)
	.fetch_one(&database)
	.await
	.map_err(|e| unknown_post_on_fk_violation(e, post_id))?;

	Ok(Json(comment))
}

/// Returns the comments of a post, newest first.
///
/// Missing posts and query failures both produce an empty list rather than
/// an error, so one bad subquery cannot take down the whole forum view.
async fn get_comments(
	State(database): State<Database>,
	_session: Session,
	Path(post_id): Path<Uuid>,
) -> impl IntoResponse {
	let comments = sqlx::query_as::<_, model::Comment>(
		r#"
			SELECT * FROM comment
			WHERE post_id = $1
			ORDER BY created_at DESC
		"#,
	)
	.bind(post_id)
	.fetch_all(&database)
	.await;

	Json(comments_or_empty(comments, post_id))
}

fn comments_or_empty(
	comments: Result<Vec<model::Comment>, sqlx::Error>,
	post_id: Uuid,
) -> Vec<model::Comment> {
	comments.unwrap_or_else(|error| {
		tracing::error!(%post_id, %error, "failed to fetch comments, degrading to an empty list");
		Vec::new()
	})
}

/// Flips the requesting user's like on a post, then returns the post with
/// its updated like information.
///
/// The flip deletes first; only when nothing was deleted is a like
/// inserted, with the `(user_id, post_id)` unique constraint absorbing a
/// concurrent insert so a pair can never hold two likes.
async fn toggle_like(
	State(database): State<Database>,
	session: Session,
	Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, crate::Error> {
	let deleted = sqlx::query(r#"DELETE FROM "like" WHERE user_id = $1 AND post_id = $2"#)
		.bind(session.user.id)
		.bind(post_id)
		.execute(&database)
		.await?;

	if deleted.rows_affected() == 0 {
		sqlx::query(
			r#"
				INSERT INTO "like" (user_id, post_id)
				VALUES ($1, $2)
				ON CONFLICT (user_id, post_id) DO NOTHING
			"#,
		)
		.bind(session.user.id)
		.bind(post_id)
		.execute(&database)
		.await
		.map_err(|e| unknown_post_on_fk_violation(e, post_id))?;
	}

	let post = sqlx::query_as::<_, model::PostWithLikes>(
		r#"
			SELECT
				post.*,
				(SELECT count(*) FROM "like" WHERE post_id = post.id) AS likes_count,
				EXISTS(
					SELECT 1 FROM "like" WHERE post_id = post.id AND user_id = $2
				) AS user_liked
			FROM post
			WHERE id = $1
		"#,
	)
	.bind(post_id)
	.bind(session.user.id)
	.fetch_optional(&database)
	.await?;

	Ok(Json(post.ok_or(Error::UnknownPost(post_id))?))
}

/// A foreign-key violation on `post_id` means the referenced post is gone.
fn unknown_post_on_fk_violation(error: sqlx::Error, post_id: Uuid) -> crate::Error {
	match error {
		sqlx::Error::Database(ref d)
			if d.constraint() == Some("comment_post_id_fkey")
				|| d.constraint() == Some("like_post_id_fkey") =>
		{
			Error::UnknownPost(post_id).into()
		}
		e => crate::Error::Database(e),
	}
}

#[cfg(test)]
mod test {
	use uuid::Uuid;

	use super::comments_or_empty;
	use crate::test::*;

	#[test]
	fn test_comments_or_empty_degrades_on_failure() {
		let comments = comments_or_empty(Err(sqlx::Error::PoolClosed), Uuid::new_v4());

		assert!(comments.is_empty());
	}

	/// Counts the like rows backing one (user, post) pair.
	async fn like_rows(pool: &Database, username: &str, post_id: Uuid) -> i64 {
		sqlx::query_scalar(
			r#"
				SELECT count(*) FROM "like"
				WHERE user_id = (SELECT id FROM "user" WHERE username = $1)
				AND post_id = $2
			"#,
		)
		.bind(username)
		.bind(post_id)
		.fetch_one(pool)
		.await
		.unwrap()
	}

	#[sqlx::test]
	async fn test_like_toggle_is_idempotent(pool: Database) {
		let app = app(pool.clone());
		register(&app, "june").await;

		let post = app
			.post("/forum/posts")
			.json(&json!({ "title": "First week", "content": "It gets easier." }))
			.await
			.json::<serde_json::Value>();
		let post_id = Uuid::parse_str(post["id"].as_str().unwrap()).unwrap();
		let like_url = format!("/forum/posts/{post_id}/like");

		// An odd number of toggles flips the state.
		let response = app.post(&like_url).await.json::<serde_json::Value>();
		assert_eq!(response["likes_count"], 1);
		assert_eq!(response["user_liked"], true);
		assert_eq!(like_rows(&pool, "june", post_id).await, 1);

		// An even number returns it to the original state.
		let response = app.post(&like_url).await.json::<serde_json::Value>();
		assert_eq!(response["likes_count"], 0);
		assert_eq!(response["user_liked"], false);
		assert_eq!(like_rows(&pool, "june", post_id).await, 0);

		// The pair is never backed by more than one row.
		let response = app.post(&like_url).await.json::<serde_json::Value>();
		assert_eq!(response["likes_count"], 1);
		assert_eq!(like_rows(&pool, "june", post_id).await, 1);
	}

	#[sqlx::test]
	async fn test_like_counts_across_users(pool: Database) {
		let app = app(pool);
		register(&app, "june").await;

		let post = app
			.post("/forum/posts")
			.json(&json!({ "title": "Check-in", "content": "How is everyone doing?" }))
			.await
			.json::<serde_json::Value>();
		let like_url = format!("/forum/posts/{}/like", post["id"].as_str().unwrap());

		app.post(&like_url).await;

		register(&app, "april").await;
		app.post(&like_url).await;

		register(&app, "sam").await;
		let posts = app.get("/forum/posts").await.json::<serde_json::Value>();
		let posts = posts.as_array().unwrap();

		assert_eq!(posts.len(), 1);
		assert_eq!(posts[0]["likes_count"], 2);
		// sam has not liked it.
		assert_eq!(posts[0]["user_liked"], false);
	}

	#[sqlx::test]
	async fn test_posts_listed_newest_first(pool: Database) {
		let app = app(pool);
		register(&app, "june").await;

		for title in ["oldest", "middle", "newest"] {
			app.post("/forum/posts")
				.json(&json!({ "title": title, "content": "..." }))
				.await;
		}

		let posts = app.get("/forum/posts").await.json::<serde_json::Value>();
		let titles = posts
			.as_array()
			.unwrap()
			.iter()
			.map(|post| post["title"].as_str().unwrap())
			.collect::<Vec<_>>();

		assert_eq!(titles, ["newest", "middle", "oldest"]);
	}

	#[sqlx::test]
	async fn test_comment_on_unknown_post(pool: Database) {
		let app = app(pool);
		register(&app, "june").await;

		let response = app
			.post(&format!("/forum/posts/{}/comments", Uuid::new_v4()))
			.json(&json!({ "content": "hello?" }))
			.await;

		assert_eq!(response.status_code(), 404);
	}

	#[sqlx::test]
	async fn test_comments_cascade_with_post(pool: Database) {
		let app = app(pool.clone());
		register(&app, "june").await;

		let post = app
			.post("/forum/posts")
			.json(&json!({ "title": "Temporary", "content": "..." }))
			.await
			.json::<serde_json::Value>();
		let post_id = post["id"].as_str().unwrap().to_owned();

		app.post(&format!("/forum/posts/{post_id}/comments"))
			.json(&json!({ "content": "first" }))
			.await;
		app.post(&format!("/forum/posts/{post_id}/like")).await;

		sqlx::query("DELETE FROM post WHERE id = $1")
			.bind(Uuid::parse_str(&post_id).unwrap())
			.execute(&pool)
			.await
			.unwrap();

		let likes: i64 = sqlx::query_scalar(r#"SELECT count(*) FROM "like""#)
			.fetch_one(&pool)
			.await
			.unwrap();
		assert_eq!(likes, 0);

		// Listing comments for the deleted post is empty, not an error.
		let response = app.get(&format!("/forum/posts/{post_id}/comments")).await;

		assert_eq!(response.status_code(), 200);
		assert!(response.json::<serde_json::Value>().as_array().unwrap().is_empty());
	}

	#[sqlx::test]
	async fn test_post_requires_title_and_content(pool: Database) {
		let app = app(pool);
		register(&app, "june").await;

		let response = app
			.post("/forum/posts")
			.json(&json!({ "title": "", "content": "body" }))
			.await;

		assert_eq!(response.status_code(), 400);
	}
}
