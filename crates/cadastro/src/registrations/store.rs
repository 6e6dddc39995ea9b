use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite};

use super::domain::{NewRegistration, Registration, RegistrationId, RegistrationStatus};
use super::repository::{RegistrationRepository, RepositoryError};
use crate::config::DatabaseConfig;

/// Column order shared by the schema, `SELECT *` and the CSV export.
pub const COLUMNS: [&str; 24] = [
    "id",
    "nome",
    "email",
    "telefone",
    "cnpj",
    "razao_social",
    "nome_fantasia",
    "cep",
    "endereco",
    "numero",
    "complemento",
    "bairro",
    "cidade",
    "uf",
    "site",
    "instagram",
    "num_funcionarios",
    "empresas_brinde",
    "segmento",
    "como_conheceu",
    "termos_aceitos",
    "status",
    "created_at",
    "notes",
];

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS registrations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nome TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    telefone TEXT NOT NULL,
    cnpj TEXT NOT NULL,
    razao_social TEXT,
    nome_fantasia TEXT,
    cep TEXT,
    endereco TEXT,
    numero TEXT,
    complemento TEXT,
    bairro TEXT,
    cidade TEXT,
    uf TEXT,
    site TEXT,
    instagram TEXT,
    num_funcionarios TEXT,
    empresas_brinde TEXT,
    segmento TEXT,
    como_conheceu TEXT,
    termos_aceitos BOOLEAN DEFAULT 0,
    status TEXT DEFAULT 'pendente',
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    notes TEXT
)
"#;

const INSERT: &str = r#"
INSERT INTO registrations
    (nome, email, telefone, cnpj, razao_social, nome_fantasia,
     cep, endereco, numero, complemento, bairro, cidade, uf,
     site, instagram, num_funcionarios, empresas_brinde,
     segmento, como_conheceu, termos_aceitos, status, created_at, notes)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, '')
"#;

const SELECT_ALL: &str = "SELECT * FROM registrations ORDER BY created_at DESC, id DESC";

/// Fixed-width UTC text so lexical order in SQLite matches chronological order. Rows written
/// by `CURRENT_TIMESTAMP` share the same prefix without the fraction.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// SQLite-backed registration store. Every operation checks a connection out of the pool for
/// its own duration; the guard returns it on every exit path.
#[derive(Debug, Clone)]
pub struct SqliteRegistrationStore {
    pool: SqlitePool,
}

impl SqliteRegistrationStore {
    /// Opens (creating if needed) the database file and applies the schema.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        tracing::info!(path = %config.path.display(), "registration store ready");
        Ok(store)
    }

    /// Private in-memory database. A single pinned connection keeps the data alive.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Idempotent; safe on every startup.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(SCHEMA).execute(&mut *conn).await?;
        Ok(())
    }

    async fn connection(&self) -> Result<PoolConnection<Sqlite>, RepositoryError> {
        self.pool.acquire().await.map_err(RepositoryError::from)
    }
}

#[async_trait]
impl RegistrationRepository for SqliteRegistrationStore {
    async fn create(
        &self,
        registration: NewRegistration,
    ) -> Result<RegistrationId, RepositoryError> {
        let mut conn = self.connection().await?;
        let created_at = format_timestamp(&Utc::now());

        let result = sqlx::query(INSERT)
            .bind(registration.name)
            .bind(registration.email)
            .bind(registration.phone)
            .bind(registration.tax_id)
            .bind(registration.legal_name)
            .bind(registration.trade_name)
            .bind(registration.postal_code)
            .bind(registration.street)
            .bind(registration.number)
            .bind(registration.complement)
            .bind(registration.neighborhood)
            .bind(registration.city)
            .bind(registration.state)
            .bind(registration.website)
            .bind(registration.social_handle)
            .bind(registration.employee_bracket)
            .bind(registration.partner_companies)
            .bind(registration.segment)
            .bind(registration.referral_source)
            .bind(registration.terms_accepted)
            .bind(RegistrationStatus::Pending.as_str())
            .bind(created_at)
            .execute(&mut *conn)
            .await?;

        Ok(RegistrationId(result.last_insert_rowid()))
    }

    async fn list_all(&self) -> Result<Vec<Registration>, RepositoryError> {
        let mut conn = self.connection().await?;
        let rows = sqlx::query(SELECT_ALL).fetch_all(&mut *conn).await?;
        rows.iter()
            .map(registration_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)
    }

    async fn update_status(
        &self,
        id: RegistrationId,
        status: RegistrationStatus,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.connection().await?;
        let result = sqlx::query("UPDATE registrations SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id.0)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn update_notes(&self, id: RegistrationId, notes: &str) -> Result<(), RepositoryError> {
        let mut conn = self.connection().await?;
        let result = sqlx::query("UPDATE registrations SET notes = ? WHERE id = ?")
            .bind(notes)
            .bind(id.0)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

fn registration_from_row(row: &SqliteRow) -> Result<Registration, sqlx::Error> {
    let text = |column: &str| -> Result<String, sqlx::Error> {
        Ok(row.try_get::<Option<String>, _>(column)?.unwrap_or_default())
    };

    let status = row
        .try_get::<Option<String>, _>("status")?
        .map(|raw| RegistrationStatus::from_str(&raw))
        .transpose()
        .map_err(|err| decode_error("status", err))?
        .unwrap_or_default();

    let created_at = row
        .try_get::<Option<String>, _>("created_at")?
        .map(|raw| parse_timestamp(&raw))
        .transpose()
        .map_err(|err| decode_error("created_at", err))?
        .unwrap_or_default();

    Ok(Registration {
        id: RegistrationId(row.try_get("id")?),
        name: text("nome")?,
        email: text("email")?,
        phone: text("telefone")?,
        tax_id: text("cnpj")?,
        legal_name: text("razao_social")?,
        trade_name: text("nome_fantasia")?,
        postal_code: text("cep")?,
        street: text("endereco")?,
        number: text("numero")?,
        complement: text("complemento")?,
        neighborhood: text("bairro")?,
        city: text("cidade")?,
        state: text("uf")?,
        website: text("site")?,
        social_handle: text("instagram")?,
        employee_bracket: text("num_funcionarios")?,
        partner_companies: text("empresas_brinde")?,
        segment: text("segmento")?,
        referral_source: text("como_conheceu")?,
        terms_accepted: row
            .try_get::<Option<bool>, _>("termos_aceitos")?
            .unwrap_or(false),
        status,
        created_at,
        notes: text("notes")?,
    })
}

/// Formats a timestamp the way the store writes it.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S%.f").map(|naive| naive.and_utc())
}

fn decode_error(
    column: &str,
    source: impl std::error::Error + Send + Sync + 'static,
) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    }
}
