use crate::cli::ServeArgs;
use crate::infra::{open_store, portal_state, AppState};
use crate::routes::with_infra_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use cadastro::config::AppConfig;
use cadastro::error::AppError;
use cadastro::portal::portal_router;
use cadastro::telemetry;
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
    config.check_secrets()?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = open_store(&config).await?;
    let portal = portal_router(portal_state(&config, store)?);

    let app = with_infra_routes(portal)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "registration portal ready");

    axum::serve(listener, app).await?;
    Ok(())
}
