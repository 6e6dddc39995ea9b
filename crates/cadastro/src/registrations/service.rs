use std::sync::Arc;

use chrono::{DateTime, Local};

use super::domain::{Registration, RegistrationId, RegistrationStatus, StatusParseError};
use super::export::{build_export, CsvExport, ExportError};
use super::intake::{parse_submission, IntakeError};
use super::repository::{RegistrationRepository, RepositoryError};

/// Service composing intake validation, the repository and the review operations.
pub struct RegistrationService<R> {
    repository: Arc<R>,
}

impl<R> RegistrationService<R>
where
    R: RegistrationRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Validate a raw JSON body and persist it as a pending registration.
    pub async fn submit(&self, body: &[u8]) -> Result<RegistrationId, RegistrationServiceError> {
        let registration = parse_submission(body)?;

        match self.repository.create(registration).await {
            Ok(id) => {
                tracing::info!(registration_id = %id, "registration received");
                Ok(id)
            }
            Err(RepositoryError::Conflict) => {
                tracing::info!("duplicate registration rejected");
                Err(RepositoryError::Conflict.into())
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Every registration, newest first.
    pub async fn list(&self) -> Result<Vec<Registration>, RegistrationServiceError> {
        Ok(self.repository.list_all().await?)
    }

    /// Parses the posted status before touching the store, so invalid values leave the row as is.
    pub async fn set_status(
        &self,
        id: RegistrationId,
        raw_status: &str,
    ) -> Result<RegistrationStatus, RegistrationServiceError> {
        let status: RegistrationStatus = raw_status.parse()?;
        self.repository.update_status(id, status).await?;
        tracing::info!(registration_id = %id, %status, "registration status updated");
        Ok(status)
    }

    pub async fn set_notes(
        &self,
        id: RegistrationId,
        notes: &str,
    ) -> Result<(), RegistrationServiceError> {
        self.repository.update_notes(id, notes).await?;
        tracing::debug!(registration_id = %id, len = notes.len(), "registration notes updated");
        Ok(())
    }

    /// Snapshot of all registrations in list order.
    pub async fn export(
        &self,
        at: DateTime<Local>,
    ) -> Result<CsvExport, RegistrationServiceError> {
        let registrations = self.repository.list_all().await?;
        let export = build_export(&registrations, at)?;
        tracing::info!(
            rows = registrations.len(),
            filename = %export.filename,
            "registrations exported"
        );
        Ok(export)
    }
}

/// Error raised by the registration service.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    InvalidStatus(#[from] StatusParseError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
