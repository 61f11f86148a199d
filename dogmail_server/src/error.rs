use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dogmail_core::api::types::{ErrorResponse, INVALID_EMAIL_ERROR, SAVE_FAILED_ERROR};
use thiserror::Error;
use tracing::error;

use crate::store::PersistenceError;

#[derive(Error, Debug)]
pub enum AppError {
    /// Unreadable body, missing field, or an address failing the shared rule
    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::InvalidEmail => (StatusCode::BAD_REQUEST, INVALID_EMAIL_ERROR),
            AppError::Persistence(err) => {
                error!(error = %err, "failed to save email");
                (StatusCode::INTERNAL_SERVER_ERROR, SAVE_FAILED_ERROR)
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}
