use argon2::Argon2;
use axum::{
	extract::State,
	http::{header, StatusCode},
	response::IntoResponse,
	routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
	extract::{Json, Session},
	model, session, AppState, Database,
};

pub const KEY_LENGTH: usize = 32;

pub fn routes() -> axum::Router<AppState> {
	axum::Router::new()
		.route("/register", post(register))
		.route("/login", post(login))
		.route("/logout", get(logout))
		.route("/me", get(me))
}

/// An error that can occur during authentication.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid username or password")]
	InvalidUsernameOrPassword,
	#[error("password validation error")]
	Argon(#[from] argon2::Error),
	#[error("no session cookie")]
	NoSessionCookie,
	#[error("invalid session cookie")]
	InvalidSessionCookie,
	#[error("admin access required")]
	AdminRequired,
	#[error("username already taken")]
	UsernameTaken,
}

impl Error {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::InvalidUsernameOrPassword
			| Self::NoSessionCookie
			| Self::InvalidSessionCookie => StatusCode::UNAUTHORIZED,
			Self::AdminRequired => StatusCode::FORBIDDEN,
			Self::Argon(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::UsernameTaken => StatusCode::CONFLICT,
		}
	}
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
	if username.chars().any(|c| !c.is_alphanumeric()) {
		return Err(ValidationError::new("username must be alphanumeric"));
	}

	Ok(())
}

#[derive(Deserialize, Validate)]
pub struct LoginInput {
	#[validate(length(min = 3, max = 16))]
	pub username: String,
	#[validate(length(min = 8, max = 128))]
	pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct RegisterInput {
	/// The username that is displayed to the public.
	#[validate(length(min = 3, max = 16), custom(function = "validate_username"))]
	pub username: String,
	#[validate(length(min = 8, max = 128))]
	pub password: String,
}

/// Hashes a password with Argon2, using the user's id as a salt.
/// Since this is only used for logging in and creating a new password,
/// the scope of this function can remain in here with no issues.
fn hash_password(
	hasher: &Argon2,
	password: &str,
	id: &Uuid,
) -> Result<[u8; KEY_LENGTH], argon2::Error> {
	let mut hash = [0; KEY_LENGTH];

	hasher.hash_password_into(password.as_bytes(), id.as_bytes(), &mut hash)?;
	Ok(hash)
}

/// Returns the authenticated user.
async fn me(session: Session) -> impl IntoResponse {
	Json(session.user)
}

/// Returns a session cookie, assuming the credentials are valid.
async fn login(
	State(state): State<AppState>,
	Json(auth): Json<LoginInput>,
) -> Result<impl IntoResponse, crate::Error> {
	let user = sqlx::query_as::<_, model::User>(r#"SELECT * FROM "user" WHERE username = $1"#)
		.bind(&auth.username)
		.fetch_one(&state.database)
		.await;

	let Ok(user) = user else {
		return Err(Error::InvalidUsernameOrPassword.into());
	};

	let hashed = hash_password(&state.hasher, &auth.password, &user.id).map_err(Error::Argon)?;

	if user.password != hashed {
		return Err(Error::InvalidUsernameOrPassword.into());
	}

	let session_id =
		sqlx::query_scalar::<_, Uuid>("INSERT INTO session (user_id) VALUES ($1) RETURNING id")
			.bind(user.id)
			.fetch_one(&state.database)
			.await?;

	let cookie = session::create_cookie(session_id);

	Ok(([(header::SET_COOKIE, cookie.to_string())], Json(user)))
}

/// Logs out of the authenticated account.
async fn logout(
	State(database): State<Database>,
	session: Session,
) -> Result<impl IntoResponse, crate::Error> {
	sqlx::query("DELETE FROM session WHERE id = $1")
		.bind(session.id)
		.execute(&database)
		.await?;

	// Clear the session cookie
	Ok([(header::SET_COOKIE, session::clear_cookie().to_string())])
}

/// Registers a new account, returning an associated session cookie.
async fn register(
	State(state): State<AppState>,
	Json(auth): Json<RegisterInput>,
) -> Result<impl IntoResponse, crate::Error> {
	let user_id = Uuid::new_v4();
	let hashed = hash_password(&state.hasher, &auth.password, &user_id).map_err(Error::Argon)?;

	let mut tx = state.database.begin().await?;

	let user = sqlx::query_as::<_, model::User>(
		r#"
			INSERT INTO "user" (id, username, password) VALUES ($1, $2, $3) RETURNING *
		"#,
	)
	.bind(user_id)
	.bind(&auth.username)
	.bind(hashed.as_slice())
	.fetch_one(&mut *tx)
	.await
	.map_err(|e| match e {
		sqlx::Error::Database(ref d) => match d.constraint() {
			Some("user_username_key") => Error::UsernameTaken.into(),
			_ => crate::Error::Database(e),
		},
		e => crate::Error::Database(e),
	})?;

	let session_id =
		sqlx::query_scalar::<_, Uuid>("INSERT INTO session (user_id) VALUES ($1) RETURNING id")
			.bind(user_id)
			.fetch_one(&mut *tx)
			.await?;

	tx.commit().await?;

	let cookie = session::create_cookie(session_id);

	Ok(([(header::SET_COOKIE, cookie.to_string())], Json(user)))
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[sqlx::test]
	async fn test_signup_flow(pool: Database) {
		let app = app(pool);

		let response = app
			.post("/auth/register")
			.json(&json!({
				"username": "june",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), 200);

		assert!(response
			.header("set-cookie")
			.to_str()
			.unwrap()
			.starts_with("haven_session="));

		let response = app
			.post("/auth/login")
			.json(&json!({
				"username": "june",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), 200);

		let response = app.get("/auth/me").await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<serde_json::Value>()["username"], "june");
	}

	#[sqlx::test]
	async fn test_username_taken(pool: Database) {
		let app = app(pool);

		let register = || {
			app.post("/auth/register").json(&json!({
				"username": "june",
				"password": "hunter2hunter",
			}))
		};

		assert_eq!(register().await.status_code(), 200);
		assert_eq!(register().await.status_code(), 409);
	}

	#[sqlx::test]
	async fn test_me_requires_session(pool: Database) {
		let app = app(pool);

		let response = app.get("/auth/me").await;

		assert_eq!(response.status_code(), 401);
	}
}
