use chrono::{DateTime, FixedOffset, Utc};
use clap::Args;
use rental_leads::config::AppConfig;
use rental_leads::error::AppError;
use rental_leads::telemetry;
use rental_leads::workflows::leads::{
    format_notification, ContactRequest, LeadDispatcher, LeadSubmission, TelegramNotifier,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct LeadArgs {
    /// Submitter name as typed into the form
    #[arg(long)]
    pub(crate) name: String,
    /// Submitter phone as typed into the form
    #[arg(long)]
    pub(crate) phone: String,
    /// Receipt time (RFC 3339). Defaults to now.
    #[arg(long, value_parser = parse_timestamp)]
    pub(crate) at: Option<DateTime<FixedOffset>>,
}

impl LeadArgs {
    fn request(&self) -> ContactRequest {
        ContactRequest::new(self.name.clone(), self.phone.clone())
    }
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map_err(|err| format!("failed to parse '{raw}' as RFC 3339 ({err})"))
}

pub(crate) fn run_preview(args: LeadArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;

    let lead = match LeadSubmission::try_from(args.request()) {
        Ok(lead) => lead,
        Err(err) => {
            println!("Lead rejected: {}", err.public_message());
            return Ok(());
        }
    };

    let received_at = args
        .at
        .map(|at| at.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);
    println!(
        "{}",
        format_notification(&lead, &received_at, config.leads.utc_offset)
    );
    Ok(())
}

pub(crate) async fn run_send_test(args: LeadArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    if args.at.is_some() {
        println!("Note: --at is ignored when sending; the relay stamps leads itself");
    }

    let notifier = Arc::new(TelegramNotifier::new(&config.telegram));
    let dispatcher = LeadDispatcher::new(notifier, config.delivery.clone(), config.leads);

    match dispatcher.dispatch(args.request()).await {
        Ok(accepted) => println!("Delivered: {}", accepted.message),
        // Operators get the detailed cause; the HTTP caller never does.
        Err(err) => println!(
            "Not delivered ({}): {}",
            err.status_code().as_u16(),
            err
        ),
    }
    Ok(())
}
