//! Lead capture: contact dialog state, the lead form, and the server-side
//! dispatcher relaying submissions to the operators' Telegram chat.

pub mod domain;
pub mod form;
pub mod message;
pub mod notifier;
pub mod popup;
pub mod router;
pub mod service;
pub mod telegram;
pub mod transport;

#[cfg(test)]
mod tests;

pub use domain::{ContactRequest, DispatchError, LeadAccepted, LeadSubmission};
pub use form::{FieldErrors, FormSnapshot, FormStatus, LeadForm, SubmitOutcome};
pub use message::{format_notification, format_notification_now};
pub use notifier::{LeadNotifier, NotifyError};
pub use popup::{PopupController, PopupOptions, PopupRequest, PopupState, UiScope};
pub use router::{contact_router, CONTACT_PATH};
pub use service::LeadDispatcher;
pub use telegram::TelegramNotifier;
pub use transport::{HttpLeadTransport, LeadTransport, TransportError};
