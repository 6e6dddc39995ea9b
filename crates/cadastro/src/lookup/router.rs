use std::sync::Arc;

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::{LookupError, LookupKind, LookupProxy};

/// Routes for `/api/cnpj/<value>` and `/api/cep/<value>`. The value may contain literal
/// slashes, as formatted CNPJs do.
pub fn lookup_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    Arc<LookupProxy>: FromRef<S>,
{
    Router::new()
        .route("/api/cnpj/*value", get(cnpj_handler))
        .route("/api/cep/*value", get(cep_handler))
}

pub(crate) async fn cnpj_handler(
    State(proxy): State<Arc<LookupProxy>>,
    Path(value): Path<String>,
) -> Response {
    relay(proxy.lookup(LookupKind::Cnpj, &value).await)
}

pub(crate) async fn cep_handler(
    State(proxy): State<Arc<LookupProxy>>,
    Path(value): Path<String>,
) -> Response {
    relay(proxy.lookup(LookupKind::Cep, &value).await)
}

fn relay(result: Result<serde_json::Value, LookupError>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(error) => {
            let status =
                StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
            let payload = json!({ "error": error.to_string() });
            (status, Json(payload)).into_response()
        }
    }
}
