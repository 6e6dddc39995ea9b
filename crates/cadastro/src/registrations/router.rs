use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{FromRef, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;

use super::domain::RegistrationId;
use super::repository::{RegistrationRepository, RepositoryError};
use super::service::{RegistrationService, RegistrationServiceError};
use crate::admin::{AdminGate, AdminSession, DASHBOARD_PATH};
use crate::error::AppError;
use crate::pages::PageRenderer;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatusForm {
    #[serde(default)]
    status: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NotesForm {
    #[serde(default)]
    notes: String,
}

/// Public form plus intake endpoint.
pub fn public_routes<R, S>() -> Router<S>
where
    R: RegistrationRepository + 'static,
    S: Clone + Send + Sync + 'static,
    Arc<RegistrationService<R>>: FromRef<S>,
    Arc<PageRenderer>: FromRef<S>,
{
    Router::new()
        .route("/cadastro", get(form_page))
        .route("/api/registrations", post(submit_handler::<R>))
}

/// Review operations. Every handler takes [`AdminSession`] first, so an unauthenticated
/// request is redirected before its path or form is even parsed.
pub fn review_routes<R, S>() -> Router<S>
where
    R: RegistrationRepository + 'static,
    S: Clone + Send + Sync + 'static,
    Arc<RegistrationService<R>>: FromRef<S>,
    Arc<PageRenderer>: FromRef<S>,
    Arc<AdminGate>: FromRef<S>,
{
    Router::new()
        .route(DASHBOARD_PATH, get(dashboard_handler::<R>))
        .route(
            "/admin/registrations/:id/status",
            post(status_handler::<R>),
        )
        .route("/admin/registrations/:id/notes", post(notes_handler::<R>))
        .route("/admin/export", get(export_handler::<R>))
}

pub(crate) async fn form_page(State(pages): State<Arc<PageRenderer>>) -> Response {
    match pages.registration_form() {
        Ok(html) => Html(html).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<RegistrationService<R>>>,
    body: Bytes,
) -> Response
where
    R: RegistrationRepository + 'static,
{
    match service.submit(&body).await {
        Ok(_) => (StatusCode::CREATED, Json(json!({ "ok": true }))).into_response(),
        Err(RegistrationServiceError::Intake(error)) => error_response(
            StatusCode::BAD_REQUEST,
            &error.to_string(),
        ),
        Err(RegistrationServiceError::Repository(RepositoryError::Conflict)) => error_response(
            StatusCode::CONFLICT,
            "Este e-mail já está cadastrado.",
        ),
        Err(other) => AppError::from(other).into_response(),
    }
}

pub(crate) async fn dashboard_handler<R>(
    _admin: AdminSession,
    State(service): State<Arc<RegistrationService<R>>>,
    State(pages): State<Arc<PageRenderer>>,
) -> Response
where
    R: RegistrationRepository + 'static,
{
    let registrations = match service.list().await {
        Ok(registrations) => registrations,
        Err(err) => return AppError::from(err).into_response(),
    };
    match pages.dashboard(&registrations) {
        Ok(html) => Html(html).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn status_handler<R>(
    _admin: AdminSession,
    State(service): State<Arc<RegistrationService<R>>>,
    Path(id): Path<i64>,
    Form(form): Form<StatusForm>,
) -> Response
where
    R: RegistrationRepository + 'static,
{
    match service.set_status(RegistrationId(id), &form.status).await {
        Ok(_) => Redirect::to(DASHBOARD_PATH).into_response(),
        Err(RegistrationServiceError::InvalidStatus(error)) => {
            error_response(StatusCode::BAD_REQUEST, &error.to_string())
        }
        Err(other) => review_failure(other),
    }
}

pub(crate) async fn notes_handler<R>(
    _admin: AdminSession,
    State(service): State<Arc<RegistrationService<R>>>,
    Path(id): Path<i64>,
    Form(form): Form<NotesForm>,
) -> Response
where
    R: RegistrationRepository + 'static,
{
    match service.set_notes(RegistrationId(id), &form.notes).await {
        Ok(()) => Redirect::to(DASHBOARD_PATH).into_response(),
        Err(other) => review_failure(other),
    }
}

pub(crate) async fn export_handler<R>(
    _admin: AdminSession,
    State(service): State<Arc<RegistrationService<R>>>,
) -> Response
where
    R: RegistrationRepository + 'static,
{
    match service.export(Local::now()).await {
        Ok(export) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={}", export.filename),
                ),
            ],
            export.body,
        )
            .into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

fn review_failure(error: RegistrationServiceError) -> Response {
    match error {
        RegistrationServiceError::Repository(RepositoryError::NotFound) => {
            error_response(StatusCode::NOT_FOUND, "Cadastro não encontrado")
        }
        other => AppError::from(other).into_response(),
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
