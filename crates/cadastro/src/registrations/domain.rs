use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier for a registration row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationId(pub i64);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review outcome managed by the admin panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RegistrationStatus {
    #[default]
    #[serde(rename = "pendente")]
    Pending,
    #[serde(rename = "aprovado")]
    Approved,
    #[serde(rename = "rejeitado")]
    Rejected,
}

impl RegistrationStatus {
    pub const ALL: [RegistrationStatus; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    /// Value persisted in the `status` column and posted by the dashboard form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pendente",
            Self::Approved => "aprovado",
            Self::Rejected => "rejeitado",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pendente",
            Self::Approved => "Aprovado",
            Self::Rejected => "Rejeitado",
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = StatusParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| StatusParseError(value.to_string()))
    }
}

/// Raised when a status outside pendente/aprovado/rejeitado is supplied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Status inválido")]
pub struct StatusParseError(pub String);

/// Fully validated submission ready for insertion. Every optional field has already been
/// defaulted to an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewRegistration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub tax_id: String,
    pub legal_name: String,
    pub trade_name: String,
    pub postal_code: String,
    pub street: String,
    pub number: String,
    pub complement: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub website: String,
    pub social_handle: String,
    pub employee_bracket: String,
    pub partner_companies: String,
    pub segment: String,
    pub referral_source: String,
    pub terms_accepted: bool,
}

/// Stored registration as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub tax_id: String,
    pub legal_name: String,
    pub trade_name: String,
    pub postal_code: String,
    pub street: String,
    pub number: String,
    pub complement: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub website: String,
    pub social_handle: String,
    pub employee_bracket: String,
    pub partner_companies: String,
    pub segment: String,
    pub referral_source: String,
    pub terms_accepted: bool,
    pub status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
    pub notes: String,
}

impl Registration {
    /// Decodes the stored partner list. Rows written by older clients may hold a bare string,
    /// which is returned as a single entry.
    pub fn partner_companies(&self) -> Vec<String> {
        let raw = self.partner_companies.trim();
        if raw.is_empty() {
            return Vec::new();
        }
        match serde_json::from_str::<Vec<String>>(raw) {
            Ok(companies) => companies,
            Err(_) => vec![raw.to_string()],
        }
    }
}
