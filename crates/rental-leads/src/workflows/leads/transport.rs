use std::time::Duration;

use async_trait::async_trait;

use super::domain::{ContactRequest, LeadAccepted};

/// Client-side path from the lead form to the dispatcher endpoint.
#[async_trait]
pub trait LeadTransport: Send + Sync {
    async fn send(&self, request: &ContactRequest) -> Result<LeadAccepted, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("endpoint answered with status {status}")]
    Status { status: u16, error: Option<String> },
    #[error("endpoint did not confirm the submission")]
    Unconfirmed,
}

/// JSON-over-HTTP transport posting to the contact endpoint.
#[derive(Debug, Clone)]
pub struct HttpLeadTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpLeadTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|error| {
                tracing::warn!(error = %error, "falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LeadTransport for HttpLeadTransport {
    async fn send(&self, request: &ContactRequest) -> Result<LeadAccepted, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|err| TransportError::Network(err.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let error = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| body.get("error")?.as_str().map(str::to_string));
            return Err(TransportError::Status {
                status: status.as_u16(),
                error,
            });
        }

        match response.json::<LeadAccepted>().await {
            Ok(accepted) if accepted.success => Ok(accepted),
            _ => Err(TransportError::Unconfirmed),
        }
    }
}
