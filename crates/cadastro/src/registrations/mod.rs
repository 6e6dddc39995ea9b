//! Registration intake, SQLite persistence and the admin review workflow.

pub mod domain;
pub mod export;
pub mod intake;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    NewRegistration, Registration, RegistrationId, RegistrationStatus, StatusParseError,
};
pub use export::{export_filename, render_csv, CsvExport, ExportError};
pub use intake::{parse_submission, IntakeError, PartnerCompanies, RegistrationPayload};
pub use repository::{RegistrationRepository, RepositoryError};
pub use router::{public_routes, review_routes};
pub use service::{RegistrationService, RegistrationServiceError};
pub use store::SqliteRegistrationStore;
