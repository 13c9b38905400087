#![warn(clippy::pedantic)]

//! A mental-health support service: authenticated users track their moods,
//! browse curated resources and talk in a community forum; administrators
//! manage users and resources and see aggregate mood analytics.

pub mod aggregate;
pub mod checklist;
pub mod error;
pub mod extract;
pub mod model;
pub mod route;
pub mod session;


use argon2::Argon2;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use error::Error;

pub type Database = sqlx::Pool<sqlx::Postgres>;
pub type AppState = State;

/// The shared application state.
///
/// This should contain all shared dependencies that handlers need to access,
/// such as a database connection pool or a hash configuration (if it's
/// expensive to create).
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub hasher: Argon2<'static>,
}

/// Assembles the full application router.
pub fn router(state: State) -> axum::Router {
	axum::Router::new()
		.nest("/auth", route::auth::routes())
		.nest("/moods", route::moods::routes())
		.nest("/resources", route::resources::routes())
		.nest("/forum", route::forum::routes())
		.nest("/admin", route::admin::routes())
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
		.with_state(state)
}
