use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AdminConfig;

const SUBJECT: &str = "admin";
const MAX_SESSION_HOURS: u64 = 24 * 366;

/// Claims carried by the signed session marker.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Senha incorreta.")]
    WrongPassword,
    #[error("invalid session token: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
    #[error("failed to sign session token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Checks the admin password and issues/verifies the HMAC-signed session token.
pub struct AdminGate {
    password: String,
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl AdminGate {
    pub fn new(config: &AdminConfig) -> Self {
        Self {
            password: config.password.clone(),
            encoding: EncodingKey::from_secret(config.secret_key.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret_key.as_bytes()),
            ttl: Duration::hours(config.session_ttl_hours.min(MAX_SESSION_HOURS) as i64),
        }
    }

    /// Plain equality against the configured secret; a match yields a fresh session token.
    pub fn login(&self, password: &str) -> Result<String, SessionError> {
        if password != self.password {
            return Err(SessionError::WrongPassword);
        }
        self.issue_at(Utc::now())
    }

    pub fn issue_at(&self, issued_at: DateTime<Utc>) -> Result<String, SessionError> {
        let claims = SessionClaims {
            sub: SUBJECT.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(SessionError::Signing)
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(SessionError::InvalidToken)?;
        Ok(data.claims)
    }

    pub fn is_authenticated(&self, token: &str) -> bool {
        self.verify(token)
            .map(|claims| claims.sub == SUBJECT)
            .unwrap_or(false)
    }
}
