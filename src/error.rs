use axum::{
	body::Body,
	extract::rejection,
	http::{Response, StatusCode},
	response::IntoResponse,
	Json,
};
use serde::Serialize;

use crate::route::{auth::Error as AuthError, forum::Error as ForumError};

/// Error type for the application.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json error: {0}")]
	Json(#[from] rejection::JsonRejection),
	#[error("auth error: {0}")]
	Auth(#[from] AuthError),
	#[error("forum error: {0}")]
	Forum(#[from] ForumError),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub success: bool,
	pub errors: Vec<String>,
}

impl ErrorResponse {
	fn single(error: impl ToString) -> Self {
		Self {
			success: false,
			errors: vec![error.to_string()],
		}
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response<Body> {
		match self {
			Error::Validation(errors) => (
				StatusCode::BAD_REQUEST,
				Json(ErrorResponse {
					errors: errors
						.field_errors()
						.into_iter()
						.flat_map(move |(field, errors)| {
							errors
								.iter()
								.map(move |error| format!("{}: {}", field, error))
						})
						.collect(),
					success: false,
				}),
			)
				.into_response(),
			Error::Json(error) => (
				StatusCode::BAD_REQUEST,
				Json(ErrorResponse::single(error)),
			)
				.into_response(),
			Error::Auth(error) => (error.status(), Json(ErrorResponse::single(error))).into_response(),
			Error::Forum(error) => (error.status(), Json(ErrorResponse::single(error))).into_response(),
			Error::Database(error) => {
				// Mutation paths fail loud, but the store error itself stays
				// out of the response body.
				tracing::error!(%error, "database error");

				(
					StatusCode::INTERNAL_SERVER_ERROR,
					Json(ErrorResponse {
						errors: Vec::new(),
						success: false,
					}),
				)
					.into_response()
			}
		}
	}
}
