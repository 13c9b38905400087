use uuid::Uuid;

pub const COOKIE_NAME: &str = "haven_session";

/// Builds the session cookie handed out on registration and login.
///
/// Sessions live in the database, so the cookie itself carries no expiry
/// and stays valid until logout deletes the row. Marked secure outside of
/// debug builds: local development runs over plain HTTP.
pub fn create_cookie(session_id: Uuid) -> cookie::Cookie<'static> {
	cookie::Cookie::build((COOKIE_NAME, session_id.to_string()))
		.secure(!cfg!(debug_assertions))
		.http_only(true)
		.same_site(cookie::SameSite::Lax)
		.path("/")
		.into()
}

/// Replaces the session cookie with one that expires immediately.
pub fn clear_cookie() -> cookie::Cookie<'static> {
	cookie::Cookie::build(COOKIE_NAME)
		.http_only(true)
		.same_site(cookie::SameSite::Lax)
		.path("/")
		.max_age(cookie::time::Duration::ZERO)
		.into()
}
