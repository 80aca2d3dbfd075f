use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{error, info};

use crate::config::{DeliveryConfig, LeadSettings};

use super::domain::{ContactRequest, DispatchError, LeadAccepted, LeadSubmission};
use super::message::format_notification;
use super::notifier::LeadNotifier;

/// Server-side relay from a contact request to the operator channel.
pub struct LeadDispatcher<N> {
    notifier: Arc<N>,
    delivery: DeliveryConfig,
    utc_offset: FixedOffset,
    clock: fn() -> DateTime<Utc>,
}

impl<N> LeadDispatcher<N>
where
    N: LeadNotifier + 'static,
{
    pub fn new(notifier: Arc<N>, delivery: DeliveryConfig, settings: LeadSettings) -> Self {
        Self {
            notifier,
            delivery,
            utc_offset: settings.utc_offset,
            clock: Utc::now,
        }
    }

    /// Pin the timestamp source, e.g. to render deterministic previews.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Validate, format and relay a single lead. Exactly one delivery attempt
    /// is made per call unless the notifier itself retries.
    pub async fn dispatch(&self, request: ContactRequest) -> Result<LeadAccepted, DispatchError> {
        let lead = LeadSubmission::try_from(request)?;

        let credentials = self.delivery.credentials().map_err(|missing| {
            error!(
                missing = ?missing,
                "lead dropped: Telegram delivery is not configured"
            );
            DispatchError::Misconfigured { missing }
        })?;

        let text = self.preview(&lead);

        if let Err(err) = self.notifier.notify(&credentials, &text).await {
            error!(error = %err, "lead notification could not be delivered");
            return Err(DispatchError::Delivery(err));
        }

        info!("lead notification delivered");
        Ok(LeadAccepted::default())
    }

    /// Render the notification a lead would produce right now.
    pub fn preview(&self, lead: &LeadSubmission) -> String {
        format_notification(lead, &(self.clock)(), self.utc_offset)
    }
}
