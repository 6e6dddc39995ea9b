use reqwest::header::ACCEPT;
use serde_json::Value;

use super::{LookupError, LookupKind};
use crate::config::LookupConfig;

/// Single-attempt HTTP client for the two upstream lookup services.
#[derive(Debug, Clone)]
pub struct LookupProxy {
    client: reqwest::Client,
    cnpj_base_url: String,
    cep_base_url: String,
}

impl LookupProxy {
    /// Every outbound call is bounded by the configured timeout; there are no retries.
    pub fn new(config: &LookupConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            cnpj_base_url: config.cnpj_base_url.trim_end_matches('/').to_string(),
            cep_base_url: config.cep_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn upstream_url(&self, kind: LookupKind, digits: &str) -> String {
        match kind {
            LookupKind::Cnpj => format!("{}/cnpj/{digits}", self.cnpj_base_url),
            LookupKind::Cep => format!("{}/ws/{digits}/json/", self.cep_base_url),
        }
    }

    /// Normalizes `raw`, queries the upstream once and relays its JSON body on HTTP 200.
    pub async fn lookup(&self, kind: LookupKind, raw: &str) -> Result<Value, LookupError> {
        let digits = kind.normalize(raw)?;
        let url = self.upstream_url(kind, &digits);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| gateway(kind, source))?;

        let status = response.status().as_u16();
        if status != 200 {
            tracing::info!(lookup = %kind, status, "upstream lookup returned no data");
            return Err(LookupError::NotFound { kind, status });
        }

        response
            .json::<Value>()
            .await
            .map_err(|source| gateway(kind, source))
    }

    pub async fn cnpj(&self, raw: &str) -> Result<Value, LookupError> {
        self.lookup(LookupKind::Cnpj, raw).await
    }

    pub async fn cep(&self, raw: &str) -> Result<Value, LookupError> {
        self.lookup(LookupKind::Cep, raw).await
    }
}

fn gateway(kind: LookupKind, source: reqwest::Error) -> LookupError {
    tracing::warn!(lookup = %kind, error = %source, "upstream lookup failed");
    LookupError::Gateway { kind, source }
}
