use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tokio::sync::Notify;

use crate::config::{DeliveryConfig, DeliveryCredentials, LeadSettings};
use crate::workflows::leads::domain::{ContactRequest, LeadAccepted};
use crate::workflows::leads::notifier::{LeadNotifier, NotifyError};
use crate::workflows::leads::service::LeadDispatcher;
use crate::workflows::leads::transport::{LeadTransport, TransportError};

pub(super) const PROVIDER_SECRET: &str = "Bad Request: chat 987654 not found for bot 123:SECRET";

pub(super) fn fixed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap()
}

pub(super) fn delivery() -> DeliveryConfig {
    DeliveryConfig::new("123:SECRET", "987654")
}

#[derive(Default)]
pub(super) struct RecordingNotifier {
    sent: Mutex<Vec<(DeliveryCredentials, String)>>,
}

impl RecordingNotifier {
    pub(super) fn messages(&self) -> Vec<String> {
        self.sent
            .lock()
            .expect("notifier mutex")
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub(super) fn calls(&self) -> usize {
        self.sent.lock().expect("notifier mutex").len()
    }

    pub(super) fn last_credentials(&self) -> Option<DeliveryCredentials> {
        self.sent
            .lock()
            .expect("notifier mutex")
            .last()
            .map(|(credentials, _)| credentials.clone())
    }
}

#[async_trait]
impl LeadNotifier for RecordingNotifier {
    async fn notify(
        &self,
        credentials: &DeliveryCredentials,
        text: &str,
    ) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .expect("notifier mutex")
            .push((credentials.clone(), text.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct RejectingNotifier {
    attempts: Mutex<usize>,
}

impl RejectingNotifier {
    pub(super) fn attempts(&self) -> usize {
        *self.attempts.lock().expect("notifier mutex")
    }
}

#[async_trait]
impl LeadNotifier for RejectingNotifier {
    async fn notify(
        &self,
        _credentials: &DeliveryCredentials,
        _text: &str,
    ) -> Result<(), NotifyError> {
        *self.attempts.lock().expect("notifier mutex") += 1;
        Err(NotifyError::Rejected {
            status: Some(400),
            description: PROVIDER_SECRET.to_string(),
        })
    }
}

pub(super) fn dispatcher<N: LeadNotifier + 'static>(
    notifier: Arc<N>,
    delivery: DeliveryConfig,
) -> LeadDispatcher<N> {
    LeadDispatcher::new(notifier, delivery, LeadSettings::default()).with_clock(fixed_clock)
}

pub(super) fn ivan() -> ContactRequest {
    ContactRequest::new("Иван", "+79001234567")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Transport whose answers are scripted per call; can be held open to
/// observe the in-flight state.
pub(super) struct ScriptedTransport {
    pub(super) requests: Mutex<Vec<ContactRequest>>,
    outcomes: Mutex<Vec<Result<(), u16>>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedTransport {
    pub(super) fn new(outcomes: Vec<Result<(), u16>>) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            outcomes: Mutex::new(outcomes),
            gate: None,
        }
    }

    pub(super) fn gated(outcomes: Vec<Result<(), u16>>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(outcomes)
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.requests.lock().expect("transport mutex").len()
    }
}

#[async_trait]
impl LeadTransport for ScriptedTransport {
    async fn send(&self, request: &ContactRequest) -> Result<LeadAccepted, TransportError> {
        self.requests
            .lock()
            .expect("transport mutex")
            .push(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let outcome = {
            let mut outcomes = self.outcomes.lock().expect("transport mutex");
            if outcomes.is_empty() {
                Ok(())
            } else {
                outcomes.remove(0)
            }
        };
        match outcome {
            Ok(()) => Ok(LeadAccepted::default()),
            Err(status) => Err(TransportError::Status {
                status,
                error: None,
            }),
        }
    }
}
