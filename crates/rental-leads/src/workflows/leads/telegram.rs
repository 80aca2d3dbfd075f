use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::config::{DeliveryCredentials, TelegramSettings};

use super::notifier::{LeadNotifier, NotifyError};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const RETRY_BASE_MS: u64 = 500;
const RETRY_MAX_MS: u64 = 8_000;

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// Bot API notifier posting to `sendMessage` in Markdown mode.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
    max_retries: u32,
}

impl TelegramNotifier {
    pub fn new(settings: &TelegramSettings) -> Self {
        let client = match reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(settings.request_timeout)
            .build()
        {
            Ok(client) => client,
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    "failed to build Telegram client with timeouts; using default client"
                );
                reqwest::Client::new()
            }
        };

        Self {
            client,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            max_retries: settings.max_retries,
        }
    }

    fn method_url(&self, token: &str, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, token, method)
    }

    async fn send_once(
        &self,
        credentials: &DeliveryCredentials,
        text: &str,
    ) -> Result<(), NotifyError> {
        let body = SendMessage {
            chat_id: &credentials.chat_id,
            text,
            parse_mode: "Markdown",
        };

        let response = self
            .client
            .post(self.method_url(&credentials.bot_token, "sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = response.status();
        let body_text = response.text().await.map_err(from_reqwest)?;
        let parsed = serde_json::from_str::<Value>(&body_text).ok();

        let ok = parsed
            .as_ref()
            .and_then(|data| data.get("ok"))
            .and_then(Value::as_bool);

        match (status.is_success(), ok) {
            (true, Some(true)) => Ok(()),
            (true, None) => Err(NotifyError::InvalidResponse(truncate(&body_text))),
            _ => Err(NotifyError::Rejected {
                status: Some(status.as_u16()),
                description: parsed
                    .as_ref()
                    .and_then(|data| data.get("description"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| truncate(&body_text)),
            }),
        }
    }
}

#[async_trait]
impl LeadNotifier for TelegramNotifier {
    async fn notify(
        &self,
        credentials: &DeliveryCredentials,
        text: &str,
    ) -> Result<(), NotifyError> {
        let mut attempt = 0;
        loop {
            match self.send_once(credentials, text).await {
                Ok(()) => return Ok(()),
                Err(error) if attempt < self.max_retries && error.is_retryable() => {
                    let delay = retry_delay(attempt);
                    tracing::warn!(
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Telegram rejected lead notification transiently; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

fn retry_delay(attempt: u32) -> Duration {
    let shift = attempt.min(10);
    Duration::from_millis(
        RETRY_BASE_MS
            .saturating_mul(1_u64 << shift)
            .min(RETRY_MAX_MS),
    )
}

fn from_reqwest(err: reqwest::Error) -> NotifyError {
    if err.is_timeout() {
        return NotifyError::Timeout;
    }
    // reqwest embeds the URL, and with it the bot token, in its messages.
    NotifyError::Transport(err.without_url().to_string())
}

fn truncate(body: &str) -> String {
    body.chars().take(200).collect()
}
