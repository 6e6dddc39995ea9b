use async_trait::async_trait;

use super::domain::{NewRegistration, Registration, RegistrationId, RegistrationStatus};

/// Storage abstraction so the review service can be exercised without SQLite.
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Inserts a row, failing with [`RepositoryError::Conflict`] when the email exists.
    async fn create(&self, registration: NewRegistration)
        -> Result<RegistrationId, RepositoryError>;
    /// All rows, newest creation time first.
    async fn list_all(&self) -> Result<Vec<Registration>, RepositoryError>;
    async fn update_status(
        &self,
        id: RegistrationId,
        status: RegistrationStatus,
    ) -> Result<(), RepositoryError>;
    async fn update_notes(&self, id: RegistrationId, notes: &str) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(value: sqlx::Error) -> Self {
        match &value {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Conflict,
            sqlx::Error::RowNotFound => Self::NotFound,
            _ => Self::Unavailable(value.to_string()),
        }
    }
}
