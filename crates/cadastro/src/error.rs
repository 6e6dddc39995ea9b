use crate::config::ConfigError;
use crate::pages::RenderError;
use crate::registrations::RegistrationServiceError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Database(sqlx::Error),
    HttpClient(reqwest::Error),
    Render(RenderError),
    Registration(RegistrationServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Database(err) => write!(f, "database error: {}", err),
            AppError::HttpClient(err) => write!(f, "http client error: {}", err),
            AppError::Render(err) => write!(f, "render error: {}", err),
            AppError::Registration(err) => write!(f, "registration error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Database(err) => Some(err),
            AppError::HttpClient(err) => Some(err),
            AppError::Render(err) => Some(err),
            AppError::Registration(err) => Some(err),
        }
    }
}

/// Only reached for failures the caller cannot fix; details stay in the logs.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        let body = Json(json!({ "error": "Erro interno" }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(value: sqlx::Error) -> Self {
        Self::Database(value)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        Self::HttpClient(value)
    }
}

impl From<RenderError> for AppError {
    fn from(value: RenderError) -> Self {
        Self::Render(value)
    }
}

impl From<RegistrationServiceError> for AppError {
    fn from(value: RegistrationServiceError) -> Self {
        Self::Registration(value)
    }
}
