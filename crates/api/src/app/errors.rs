use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use axum::extract::rejection::{BytesRejection, JsonRejection, QueryRejection};
use todoboard_core::DomainError;
use todoboard_infra::RepositoryError;

pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// Anything that can go wrong while serving a request.
///
/// Callers only ever see a 500 with a generic message; the variant and its
/// details go to the log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("missing query parameter `{0}`")]
    MissingParam(&'static str),

    #[error("invalid query string: {0}")]
    Query(#[from] QueryRejection),

    #[error("invalid request body: {0}")]
    Body(#[from] JsonRejection),

    #[error("failed to read request body: {0}")]
    BodyRead(#[from] BytesRejection),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR)
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "message": message.into(),
        })),
    )
        .into_response()
}
