use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::http_client::{create_submit_client, ClientConfig};
use super::types::{ErrorResponse, SubmitEmailRequest, SUBMIT_EMAIL_PATH};
use crate::utils::error::TransportError;

/// Delivers one email address to the store behind the submission endpoint.
#[async_trait]
pub trait EmailSubmitter: Send + Sync {
    /// Resolves once the store acknowledged the write.
    async fn submit_email(&self, email: &str) -> Result<(), TransportError>;
}

/// `EmailSubmitter` posting JSON to `<base_url>/api/submit-email`.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpSubmitter {
    pub fn new(base_url: &str, config: ClientConfig) -> Result<Self, TransportError> {
        let client = create_submit_client(&config)?;
        Ok(Self::with_client(client, base_url, config.timeout))
    }

    pub fn with_client(client: Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), SUBMIT_EMAIL_PATH),
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_send_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            TransportError::from(err)
        }
    }
}

#[async_trait]
impl EmailSubmitter for HttpSubmitter {
    async fn submit_email(&self, email: &str) -> Result<(), TransportError> {
        debug!(endpoint = %self.endpoint, "submitting email");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&SubmitEmailRequest {
                email: email.to_string(),
            })
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        // Prefer the server's own message, fall back to the status text
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string(),
        };

        warn!(status = status.as_u16(), %message, "email submission rejected");
        Err(TransportError::Status {
            status_code: status.as_u16(),
            message,
        })
    }
}
