use crate::cli::ServeArgs;
use crate::infra::{build_judgment_source, AppState, InMemoryProjectRepository};
use crate::routes::with_partner_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use license_finder::config::AppConfig;
use license_finder::error::AppError;
use license_finder::telemetry;
use license_finder::workflows::partners::PartnerDiscoveryService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryProjectRepository::default());
    let judgment = Arc::new(build_judgment_source(&config.judgment));
    let discovery_service = Arc::new(PartnerDiscoveryService::new(
        repository,
        judgment,
        &config.scoring,
    ));

    let app = with_partner_routes(discovery_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        call_delay_ms = config.scoring.call_delay.as_millis() as u64,
        "license finder ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
