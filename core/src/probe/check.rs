//! Model listing client

use super::models::{ModelDescriptor, ModelList};
use crate::error::ProbeError;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Queries `GET <root>/v1/models` once, without retries
#[derive(Debug, Clone)]
pub struct ModelServerClient {
    client: Client,
    timeout: Duration,
}

impl ModelServerClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    /// Fetch the model list from `endpoint`
    pub async fn list_models(&self, endpoint: &str) -> Result<Vec<ModelDescriptor>, ProbeError> {
        tracing::debug!("GET {} (timeout {:?})", endpoint, self.timeout);

        let response = self
            .client
            .get(endpoint)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(endpoint, &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(endpoint, &e))?;

        if status != StatusCode::OK {
            tracing::warn!("{} answered with HTTP {}", endpoint, status.as_u16());
            return Err(ProbeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let listing: ModelList =
            serde_json::from_str(&body).map_err(|e| ProbeError::MalformedResponse {
                message: e.to_string(),
            })?;

        tracing::debug!("{} listed {} model(s)", endpoint, listing.data.len());
        Ok(listing.data)
    }

    fn transport_error(&self, endpoint: &str, error: &reqwest::Error) -> ProbeError {
        let message = if error.is_timeout() {
            format!("request timed out after {}s", self.timeout.as_secs_f64())
        } else {
            error_chain(error)
        };
        tracing::warn!("Request to {} failed: {}", endpoint, message);

        ProbeError::Transport {
            endpoint: endpoint.to_string(),
            message,
        }
    }
}

/// Join an error with all of its sources
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
