use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::response::Response;
use chrono::Utc;
use serde_json::{json, Value};

use crate::admin::AdminGate;
use crate::config::{AdminConfig, LookupConfig};
use crate::lookup::LookupProxy;
use crate::pages::PageRenderer;
use crate::portal::PortalState;
use crate::registrations::{
    NewRegistration, Registration, RegistrationId, RegistrationRepository, RegistrationService,
    RegistrationStatus, RepositoryError,
};

pub(super) const ADMIN_PASSWORD: &str = "painel-admin";

#[derive(Default)]
pub(super) struct MemoryRepository {
    rows: Mutex<Vec<Registration>>,
    sequence: AtomicI64,
}

impl MemoryRepository {
    pub(super) fn rows(&self) -> Vec<Registration> {
        self.rows.lock().expect("repository mutex poisoned").clone()
    }
}

#[async_trait]
impl RegistrationRepository for MemoryRepository {
    async fn create(
        &self,
        registration: NewRegistration,
    ) -> Result<RegistrationId, RepositoryError> {
        let mut rows = self.rows.lock().expect("repository mutex poisoned");
        if rows.iter().any(|row| row.email == registration.email) {
            return Err(RepositoryError::Conflict);
        }
        let id = RegistrationId(self.sequence.fetch_add(1, Ordering::Relaxed) + 1);
        rows.push(Registration {
            id,
            name: registration.name,
            email: registration.email,
            phone: registration.phone,
            tax_id: registration.tax_id,
            legal_name: registration.legal_name,
            trade_name: registration.trade_name,
            postal_code: registration.postal_code,
            street: registration.street,
            number: registration.number,
            complement: registration.complement,
            neighborhood: registration.neighborhood,
            city: registration.city,
            state: registration.state,
            website: registration.website,
            social_handle: registration.social_handle,
            employee_bracket: registration.employee_bracket,
            partner_companies: registration.partner_companies,
            segment: registration.segment,
            referral_source: registration.referral_source,
            terms_accepted: registration.terms_accepted,
            status: RegistrationStatus::Pending,
            created_at: Utc::now(),
            notes: String::new(),
        });
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<Registration>, RepositoryError> {
        let mut rows = self.rows();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.0.cmp(&a.id.0)));
        Ok(rows)
    }

    async fn update_status(
        &self,
        id: RegistrationId,
        status: RegistrationStatus,
    ) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().expect("repository mutex poisoned");
        let row = rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(RepositoryError::NotFound)?;
        row.status = status;
        Ok(())
    }

    async fn update_notes(&self, id: RegistrationId, notes: &str) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().expect("repository mutex poisoned");
        let row = rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(RepositoryError::NotFound)?;
        row.notes = notes.to_string();
        Ok(())
    }
}

pub(super) struct UnavailableRepository;

#[async_trait]
impl RegistrationRepository for UnavailableRepository {
    async fn create(&self, _: NewRegistration) -> Result<RegistrationId, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn list_all(&self) -> Result<Vec<Registration>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn update_status(
        &self,
        _: RegistrationId,
        _: RegistrationStatus,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn update_notes(&self, _: RegistrationId, _: &str) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn payload(email: &str) -> Value {
    json!({
        "nome": "Ana Souza",
        "email": email,
        "telefone": "11 99999-0000",
        "cnpj": "11.222.333/0001-81",
        "razao_social": "Acme Comércio Ltda",
        "cidade": "São Paulo",
        "uf": "SP",
        "empresas_brinde": ["Beta, S.A.", "Gama"],
        "termos_aceitos": true,
    })
}

pub(super) fn body(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).expect("serializable payload")
}

pub(super) fn admin_gate() -> AdminGate {
    AdminGate::new(&AdminConfig {
        password: ADMIN_PASSWORD.to_string(),
        secret_key: "test-signing-key".to_string(),
        session_ttl_hours: 1,
    })
}

pub(super) fn portal_state<R>(repository: Arc<R>) -> PortalState<R>
where
    R: RegistrationRepository + 'static,
{
    let lookups = LookupProxy::new(&LookupConfig {
        cnpj_base_url: "http://127.0.0.1:9".to_string(),
        cep_base_url: "http://127.0.0.1:9".to_string(),
        timeout: Duration::from_millis(200),
    })
    .expect("client builds");

    PortalState {
        registrations: Arc::new(RegistrationService::new(repository)),
        lookups: Arc::new(lookups),
        gate: Arc::new(admin_gate()),
        pages: Arc::new(PageRenderer::new().expect("templates parse")),
    }
}

/// `Cookie` header value for an authenticated admin.
pub(super) fn admin_cookie() -> String {
    let token = admin_gate().login(ADMIN_PASSWORD).expect("password accepted");
    format!("{}={token}", crate::admin::SESSION_COOKIE)
}

pub(super) fn with_cookie(
    builder: axum::http::request::Builder,
    cookie: &str,
) -> axum::http::request::Builder {
    builder.header(COOKIE, cookie)
}

pub(super) fn set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

pub(super) fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(axum::http::header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

pub(super) async fn read_body(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    serde_json::from_str(&read_body(response).await).expect("json payload")
}
