//! Server-rendered pages for the public form and the admin panel.

use minijinja::{context, Environment};
use serde::Serialize;

use crate::registrations::{Registration, RegistrationStatus};

const REGISTRATION_FORM: &str = "cadastro.html";
const ADMIN_LOGIN: &str = "admin_login.html";
const ADMIN_DASHBOARD: &str = "admin_dashboard.html";

#[derive(Debug, thiserror::Error)]
#[error("template rendering failed: {0}")]
pub struct RenderError(#[from] minijinja::Error);

/// Dashboard row with the partner list already decoded.
#[derive(Debug, Serialize)]
struct DashboardEntry<'a> {
    #[serde(flatten)]
    registration: &'a Registration,
    partners: Vec<String>,
    status_label: &'static str,
    created_display: String,
}

#[derive(Debug, Serialize)]
struct StatusOption {
    value: &'static str,
    label: &'static str,
}

pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.add_template(
            REGISTRATION_FORM,
            include_str!("../../templates/cadastro.html"),
        )?;
        env.add_template(ADMIN_LOGIN, include_str!("../../templates/admin_login.html"))?;
        env.add_template(
            ADMIN_DASHBOARD,
            include_str!("../../templates/admin_dashboard.html"),
        )?;
        Ok(Self { env })
    }

    pub fn registration_form(&self) -> Result<String, RenderError> {
        Ok(self.env.get_template(REGISTRATION_FORM)?.render(context! {})?)
    }

    pub fn login(&self, wrong_password: bool) -> Result<String, RenderError> {
        Ok(self
            .env
            .get_template(ADMIN_LOGIN)?
            .render(context! { wrong_password => wrong_password })?)
    }

    pub fn dashboard(&self, registrations: &[Registration]) -> Result<String, RenderError> {
        let entries: Vec<DashboardEntry<'_>> = registrations
            .iter()
            .map(|registration| DashboardEntry {
                registration,
                partners: registration.partner_companies(),
                status_label: registration.status.label(),
                created_display: registration
                    .created_at
                    .format("%d/%m/%Y %H:%M")
                    .to_string(),
            })
            .collect();
        let statuses: Vec<StatusOption> = RegistrationStatus::ALL
            .iter()
            .map(|status| StatusOption {
                value: status.as_str(),
                label: status.label(),
            })
            .collect();

        Ok(self.env.get_template(ADMIN_DASHBOARD)?.render(context! {
            registrations => entries,
            statuses => statuses,
            total => registrations.len(),
        })?)
    }
}
