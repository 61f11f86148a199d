//! Submission transport: the form's only outbound call.

pub mod http_client;
pub mod submit;
pub mod types;

pub use submit::{EmailSubmitter, HttpSubmitter};
pub use types::{ErrorResponse, SubmitEmailRequest, SubmitEmailResponse, SUBMIT_EMAIL_PATH};
