//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;

use crate::events::{EventError, StoreError};

// Errors

pub struct ApiError(anyhow::Error);

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<EventError>() {
            Some(EventError::EventNotFound(_))
            | Some(EventError::RemindeeNotFound(_))
            | Some(EventError::AttendeeNotFound(_)) => StatusCode::NOT_FOUND,
            Some(EventError::NotOwner) => StatusCode::FORBIDDEN,
            Some(EventError::Unauthenticated) => StatusCode::UNAUTHORIZED,
            Some(EventError::NotGroup) => StatusCode::BAD_REQUEST,
            Some(EventError::Conflict(_)) | Some(EventError::Store(StoreError::Busy)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Some(EventError::Store(_)) | None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self.0);
        } else {
            tracing::debug!("{}", self.0);
        }

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// Re-export public types from each route

pub mod events {
    pub use crate::api::routes::events::public::*;
}
