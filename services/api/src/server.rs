use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use rental_leads::config::AppConfig;
use rental_leads::error::AppError;
use rental_leads::telemetry;
use rental_leads::workflows::leads::{LeadDispatcher, TelegramNotifier};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    if let Err(missing) = config.delivery.credentials() {
        warn!(
            ?missing,
            "Telegram delivery is not configured; contact submissions will fail until it is"
        );
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let notifier = Arc::new(TelegramNotifier::new(&config.telegram));
    let dispatcher = Arc::new(LeadDispatcher::new(
        notifier,
        config.delivery.clone(),
        config.leads,
    ));

    let app = with_operational_routes(dispatcher)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "lead relay ready");

    axum::serve(listener, app).await?;
    Ok(())
}
