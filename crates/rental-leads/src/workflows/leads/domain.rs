use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use super::notifier::NotifyError;

pub const SUCCESS_MESSAGE: &str = "Заявка успешно отправлена";
pub const MISSING_FIELDS_MESSAGE: &str = "Имя и телефон обязательны для заполнения";
pub const MALFORMED_PAYLOAD_MESSAGE: &str = "Некорректный формат запроса";
pub const MISCONFIGURED_MESSAGE: &str = "Ошибка конфигурации сервера";
pub const DELIVERY_FAILED_MESSAGE: &str = "Не удалось отправить заявку";

/// Raw contact payload as it arrives over the wire.
///
/// Fields are optional so that an absent key and an empty string take the
/// same validation path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ContactRequest {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            phone: Some(phone.into()),
        }
    }
}

/// A validated lead: both fields present and non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadSubmission {
    name: String,
    phone: String,
}

impl LeadSubmission {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }
}

impl TryFrom<ContactRequest> for LeadSubmission {
    type Error = DispatchError;

    fn try_from(request: ContactRequest) -> Result<Self, Self::Error> {
        let name = present(request.name);
        let phone = present(request.phone);
        match (name, phone) {
            (Some(name), Some(phone)) => Ok(Self { name, phone }),
            _ => Err(DispatchError::MissingFields),
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

/// Body returned to the caller once the provider accepted the notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadAccepted {
    pub success: bool,
    pub message: String,
}

impl Default for LeadAccepted {
    fn default() -> Self {
        Self {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }
}

/// Error taxonomy of the dispatcher.
///
/// `Display` carries operator detail for logs; callers only ever see
/// [`DispatchError::public_message`].
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("name or phone missing from submission")]
    MissingFields,
    #[error("request body is not a contact payload: {0}")]
    MalformedPayload(String),
    #[error("delivery configuration incomplete, missing {}", .missing.join(", "))]
    Misconfigured { missing: Vec<&'static str> },
    #[error("notification delivery failed: {0}")]
    Delivery(#[from] NotifyError),
}

impl DispatchError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::MissingFields | DispatchError::MalformedPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            DispatchError::Misconfigured { .. } | DispatchError::Delivery(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn public_message(&self) -> &'static str {
        match self {
            DispatchError::MissingFields => MISSING_FIELDS_MESSAGE,
            DispatchError::MalformedPayload(_) => MALFORMED_PAYLOAD_MESSAGE,
            DispatchError::Misconfigured { .. } => MISCONFIGURED_MESSAGE,
            DispatchError::Delivery(_) => DELIVERY_FAILED_MESSAGE,
        }
    }

    pub fn is_user_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}
