use std::sync::Arc;

use axum::{
    extract::{FromRef, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;

use super::gate::{AdminGate, SessionError};
use super::session::{
    cleared_session_cookie, session_cookie, SessionContext, DASHBOARD_PATH, LOGIN_PATH,
};
use crate::error::AppError;
use crate::pages::PageRenderer;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LoginForm {
    #[serde(default)]
    password: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LoginQuery {
    #[serde(default)]
    error: Option<String>,
}

/// Login page, login submission and logout.
pub fn session_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    Arc<AdminGate>: FromRef<S>,
    Arc<PageRenderer>: FromRef<S>,
{
    Router::new()
        .route(LOGIN_PATH, get(login_page))
        .route("/admin/login", post(login_submit))
        .route("/admin/logout", get(logout))
}

pub(crate) async fn login_page(
    session: SessionContext,
    State(pages): State<Arc<PageRenderer>>,
    Query(query): Query<LoginQuery>,
) -> Response {
    if session.authenticated {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }
    match pages.login(query.error.is_some()) {
        Ok(html) => Html(html).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn login_submit(
    State(gate): State<Arc<AdminGate>>,
    Form(form): Form<LoginForm>,
) -> Response {
    match gate.login(&form.password) {
        Ok(token) => {
            tracing::info!("admin session started");
            (
                [(header::SET_COOKIE, session_cookie(&token))],
                Redirect::to(DASHBOARD_PATH),
            )
                .into_response()
        }
        Err(SessionError::WrongPassword) => {
            tracing::warn!("admin login rejected");
            Redirect::to(&format!("{LOGIN_PATH}?error=1")).into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "admin session could not be issued");
            (StatusCode::INTERNAL_SERVER_ERROR, "session unavailable").into_response()
        }
    }
}

pub(crate) async fn logout() -> Response {
    (
        [(header::SET_COOKIE, cleared_session_cookie())],
        Redirect::to(LOGIN_PATH),
    )
        .into_response()
}
