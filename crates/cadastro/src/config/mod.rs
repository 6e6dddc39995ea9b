use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ADMIN_PASSWORD: &str = "changeme";
pub const DEFAULT_SECRET_KEY: &str = "dev-secret-change-me";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub database: DatabaseConfig,
    pub admin: AdminConfig,
    pub lookup: LookupConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&var_or("APP_ENV", "development"));

        let host = var_or("APP_HOST", "127.0.0.1");
        let port = var_or("APP_PORT", "5000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = var_or("APP_LOG_LEVEL", "info");

        let database = DatabaseConfig {
            path: PathBuf::from(var_or("DATABASE_PATH", "/app/data/registrations.db")),
        };

        let admin = AdminConfig {
            password: var_or("ADMIN_PASSWORD", DEFAULT_ADMIN_PASSWORD),
            secret_key: var_or("SECRET_KEY", DEFAULT_SECRET_KEY),
            session_ttl_hours: parse_number("SESSION_TTL_HOURS", "12")?,
        };

        let lookup = LookupConfig {
            cnpj_base_url: var_or("CNPJ_API_URL", "https://publica.cnpj.ws"),
            cep_base_url: var_or("CEP_API_URL", "https://viacep.com.br"),
            timeout: Duration::from_secs(parse_number("LOOKUP_TIMEOUT_SECS", "10")?),
        };

        let config = Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            database,
            admin,
            lookup,
        };
        Ok(config)
    }

    /// Production refuses the shipped admin password and session key. Called after telemetry
    /// is up so the development warning is visible.
    pub fn check_secrets(&self) -> Result<(), ConfigError> {
        let insecure = [
            ("ADMIN_PASSWORD", self.admin.password == DEFAULT_ADMIN_PASSWORD),
            ("SECRET_KEY", self.admin.secret_key == DEFAULT_SECRET_KEY),
        ];

        for (variable, is_default) in insecure {
            if !is_default {
                continue;
            }
            if self.environment == AppEnvironment::Production {
                return Err(ConfigError::InsecureDefault { variable });
            }
            tracing::warn!(variable, "using insecure default; override before deploying");
        }
        Ok(())
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_number(name: &'static str, default: &str) -> Result<u64, ConfigError> {
    var_or(name, default)
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidNumber { variable: name })
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Location of the SQLite registrations file.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

/// Admin gate secrets.
#[derive(Clone)]
pub struct AdminConfig {
    pub password: String,
    pub secret_key: String,
    pub session_ttl_hours: u64,
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConfig")
            .field("password", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("session_ttl_hours", &self.session_ttl_hours)
            .finish()
    }
}

/// Upstream endpoints for the CNPJ and CEP lookups.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub cnpj_base_url: String,
    pub cep_base_url: String,
    pub timeout: Duration,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { variable: &'static str },
    InsecureDefault { variable: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { variable } => {
                write!(f, "{variable} must be a non-negative integer")
            }
            ConfigError::InsecureDefault { variable } => {
                write!(f, "{variable} must be overridden in production")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InsecureDefault { .. } => None,
        }
    }
}
