use async_trait::async_trait;

use crate::config::DeliveryCredentials;

/// Outbound channel that receives formatted lead notifications.
#[async_trait]
pub trait LeadNotifier: Send + Sync {
    async fn notify(
        &self,
        credentials: &DeliveryCredentials,
        text: &str,
    ) -> Result<(), NotifyError>;
}

/// Failure reported by a notifier. Never shown to submitters.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("provider unreachable: {0}")]
    Transport(String),
    #[error("provider did not answer within the request timeout")]
    Timeout,
    #[error("provider rejected message (status {status:?}): {description}")]
    Rejected {
        status: Option<u16>,
        description: String,
    },
    #[error("provider returned an unreadable response: {0}")]
    InvalidResponse(String),
}

impl NotifyError {
    /// Whether the provider signalled a transient condition where the message
    /// was definitely not accepted.
    pub fn is_retryable(&self) -> bool {
        match self {
            NotifyError::Rejected {
                status: Some(code), ..
            } => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}
