//! Wire format of `POST /api/submit-email`, shared by client and server.

use serde::{Deserialize, Serialize};

pub const SUBMIT_EMAIL_PATH: &str = "/api/submit-email";

/// Server-side message for rejected addresses
pub const INVALID_EMAIL_ERROR: &str = "Invalid email address";

/// Server-side message for store failures
pub const SAVE_FAILED_ERROR: &str = "Failed to save email";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitEmailRequest {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitEmailResponse {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
