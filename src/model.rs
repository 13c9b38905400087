use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user.
///
/// Use this when fetching from the database and returning to the client.
/// The `password` field holds the argon2 hash and is never serialized.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct User {
	pub id: Uuid,
	pub username: String,
	/// argon2, salted with `id`
	#[serde(skip)]
	pub password: Vec<u8>,
	pub is_admin: bool,
	pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A single mood entry, owned by one user.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Mood {
	pub id: Uuid,
	pub user_id: Uuid,
	/// One of the five discrete mood levels, 0 (lowest) to 4 (highest).
	pub rating: i32,
	pub note: Option<String>,
	pub created_at: chrono::DateTime<chrono::Utc>,
}

/// The recognized kinds of curated resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "resource_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
	Pdf,
	Zip,
	Video,
	Article,
}

/// A curated support resource, managed by administrators.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Resource {
	pub id: Uuid,
	pub title: String,
	pub description: String,
	pub r#type: ResourceType,
	pub url: String,
	pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A forum post, created by a user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Post {
	pub id: Uuid,
	pub user_id: Uuid,
	pub title: String,
	pub content: String,
	pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A forum post augmented with its like aggregation.
///
/// `likes_count` is 0 (not absent) for posts nobody has liked.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct PostWithLikes {
	#[serde(flatten)]
	#[sqlx(flatten)]
	pub post: Post,
	pub likes_count: i64,
	pub user_liked: bool,
}

/// A comment on a forum post, removed when the post is removed.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Comment {
	pub id: Uuid,
	pub user_id: Uuid,
	pub post_id: Uuid,
	pub content: String,
	pub created_at: chrono::DateTime<chrono::Utc>,
}
