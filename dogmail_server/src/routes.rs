use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use dogmail_core::api::types::SubmitEmailResponse;
use dogmail_core::validation::validate_email;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::AppError;
use crate::state::AppState;
use crate::store::Fields;

/// `POST /api/submit-email`: validate with the shared rule, then append
/// `{email}` to the emails collection.
///
/// An unreadable body (not JSON, wrong content type, no string `email`) is a
/// 400 `Invalid email address`, not the 500 `Failed to save email` a
/// catch-all handler would give. Only store failures are 500.
pub async fn submit_email_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SubmitEmailResponse>, AppError> {
    let Json(body) = payload.map_err(|rejection| {
        debug!(%rejection, "unreadable submit body");
        AppError::InvalidEmail
    })?;

    let email = body
        .get("email")
        .and_then(Value::as_str)
        .ok_or(AppError::InvalidEmail)?;

    validate_email(email).map_err(|err| {
        debug!(error = %err, "rejected email");
        AppError::InvalidEmail
    })?;

    let mut fields = Fields::new();
    fields.insert("email".to_string(), Value::String(email.to_string()));
    let document = state.store.append(&state.collection, fields).await?;

    info!(id = %document.id, collection = %state.collection, "email stored");
    Ok(Json(SubmitEmailResponse { success: true }))
}

pub async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
