use cadastro::admin::AdminGate;
use cadastro::config::AppConfig;
use cadastro::error::AppError;
use cadastro::lookup::LookupProxy;
use cadastro::pages::PageRenderer;
use cadastro::portal::PortalState;
use cadastro::registrations::{RegistrationService, SqliteRegistrationStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Opens the registration database, creating the file and table when missing.
pub(crate) async fn open_store(
    config: &AppConfig,
) -> Result<Arc<SqliteRegistrationStore>, AppError> {
    let store = SqliteRegistrationStore::connect(&config.database).await?;
    Ok(Arc::new(store))
}

pub(crate) fn portal_state(
    config: &AppConfig,
    store: Arc<SqliteRegistrationStore>,
) -> Result<PortalState<SqliteRegistrationStore>, AppError> {
    Ok(PortalState {
        registrations: Arc::new(RegistrationService::new(store)),
        lookups: Arc::new(LookupProxy::new(&config.lookup)?),
        gate: Arc::new(AdminGate::new(&config.admin)),
        pages: Arc::new(PageRenderer::new()?),
    })
}
