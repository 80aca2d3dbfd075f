use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use super::domain::ContactRequest;
use super::transport::LeadTransport;

pub const NAME_REQUIRED: &str = "Введите имя";
pub const PHONE_REQUIRED: &str = "Введите телефон";
pub const SUBMIT_FAILED: &str = "Не удалось отправить заявку. Попробуйте позже.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum FormStatus {
    Idle,
    Submitting,
    Success,
    Error(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    pub name: Option<&'static str>,
    pub phone: Option<&'static str>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none()
    }
}

/// What the UI renders for the form at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSnapshot {
    pub name: String,
    pub phone: String,
    pub status: FormStatus,
    pub errors: FieldErrors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Sent,
    Invalid,
    Failed,
    InFlight,
}

#[derive(Debug)]
struct FormInner {
    name: String,
    phone: String,
    status: FormStatus,
    errors: FieldErrors,
}

impl Default for FormInner {
    fn default() -> Self {
        Self {
            name: String::new(),
            phone: String::new(),
            status: FormStatus::Idle,
            errors: FieldErrors::default(),
        }
    }
}

/// Name + phone form backed by a [`LeadTransport`].
///
/// Clones share state, so a button and the submit task observe the same
/// in-flight status.
pub struct LeadForm<T> {
    inner: Arc<Mutex<FormInner>>,
    transport: Arc<T>,
}

impl<T> Clone for LeadForm<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T> LeadForm<T>
where
    T: LeadTransport + 'static,
{
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FormInner::default())),
            transport,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormInner> {
        self.inner.lock().expect("lead form mutex poisoned")
    }

    pub fn snapshot(&self) -> FormSnapshot {
        let inner = self.lock();
        FormSnapshot {
            name: inner.name.clone(),
            phone: inner.phone.clone(),
            status: inner.status.clone(),
            errors: inner.errors.clone(),
        }
    }

    /// Submit button state.
    pub fn can_submit(&self) -> bool {
        self.lock().status != FormStatus::Submitting
    }

    // Inputs are read-only while a request is outstanding.
    pub fn set_name(&self, value: impl Into<String>) {
        let mut inner = self.lock();
        if inner.status != FormStatus::Submitting {
            inner.name = value.into();
            inner.errors.name = None;
        }
    }

    pub fn set_phone(&self, value: impl Into<String>) {
        let mut inner = self.lock();
        if inner.status != FormStatus::Submitting {
            inner.phone = value.into();
            inner.errors.phone = None;
        }
    }

    pub fn reset(&self) {
        let mut inner = self.lock();
        if inner.status != FormStatus::Submitting {
            *inner = FormInner::default();
        }
    }

    /// Validate locally and send at most one request.
    pub async fn submit(&self) -> SubmitOutcome {
        let request = {
            let mut inner = self.lock();
            if inner.status == FormStatus::Submitting {
                return SubmitOutcome::InFlight;
            }

            let errors = FieldErrors {
                name: inner.name.trim().is_empty().then_some(NAME_REQUIRED),
                phone: inner.phone.trim().is_empty().then_some(PHONE_REQUIRED),
            };
            if !errors.is_empty() {
                inner.errors = errors;
                return SubmitOutcome::Invalid;
            }

            inner.errors = FieldErrors::default();
            inner.status = FormStatus::Submitting;
            ContactRequest::new(inner.name.trim(), inner.phone.trim())
        };

        let mut in_flight = InFlightGuard {
            inner: Arc::clone(&self.inner),
            armed: true,
        };
        let result = self.transport.send(&request).await;
        in_flight.armed = false;

        let mut inner = self.lock();
        match result {
            Ok(_) => {
                inner.name.clear();
                inner.phone.clear();
                inner.status = FormStatus::Success;
                SubmitOutcome::Sent
            }
            Err(err) => {
                tracing::warn!(error = %err, "lead submission failed");
                inner.status = FormStatus::Error(SUBMIT_FAILED.to_string());
                SubmitOutcome::Failed
            }
        }
    }
}

/// Returns the form to `Idle` when a submit future is dropped mid-request.
struct InFlightGuard {
    inner: Arc<Mutex<FormInner>>,
    armed: bool,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.status == FormStatus::Submitting {
            inner.status = FormStatus::Idle;
        }
    }
}
