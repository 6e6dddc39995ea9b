use std::convert::Infallible;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::response::Redirect;

use super::gate::AdminGate;

pub const SESSION_COOKIE: &str = "cadastro_session";
pub const LOGIN_PATH: &str = "/admin";
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

/// `Set-Cookie` value carrying a freshly issued session token. It lives for the browser
/// session; expiry is enforced by the token itself.
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value that drops the session marker.
pub fn cleared_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Finds the session token among the request cookies.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token)
        .filter(|token| !token.is_empty())
}

/// Per-request authentication state, resolved from the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    pub authenticated: bool,
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
    Arc<AdminGate>: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = Arc::<AdminGate>::from_ref(state);
        let authenticated = session_token(&parts.headers)
            .map(|token| gate.is_authenticated(token))
            .unwrap_or(false);
        Ok(Self { authenticated })
    }
}

/// Proof that the request carries a valid admin session. Handlers taking this extractor are
/// never entered without one; the caller is sent to the login page instead.
#[derive(Debug, Clone, Copy)]
pub struct AdminSession;

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
    Arc<AdminGate>: FromRef<S>,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let context = match SessionContext::from_request_parts(parts, state).await {
            Ok(context) => context,
            Err(never) => match never {},
        };

        if context.authenticated {
            Ok(AdminSession)
        } else {
            Err(Redirect::to(LOGIN_PATH))
        }
    }
}
