use crate::infra::open_store;
use cadastro::config::AppConfig;
use cadastro::error::AppError;
use cadastro::registrations::RegistrationService;
use cadastro::telemetry;
use chrono::Local;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct ExportArgs {
    /// Destination file. Defaults to the generated `cadastros_<timestamp>.csv` name.
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

/// Same CSV the admin panel serves, written straight from the configured database.
pub(crate) async fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let store = open_store(&config).await?;
    let service = RegistrationService::new(store);
    let export = service.export(Local::now()).await?;

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(&export.filename));
    std::fs::write(&path, export.body.as_bytes())?;
    println!("{}", path.display());
    Ok(())
}
