//! Composition of the public form, lookup proxy and admin panel into one router.

use std::sync::Arc;

use axum::extract::FromRef;
use axum::Router;

use crate::admin::{session_routes, AdminGate};
use crate::lookup::{lookup_routes, LookupProxy};
use crate::pages::PageRenderer;
use crate::registrations::{
    public_routes, review_routes, RegistrationRepository, RegistrationService,
};

/// Shared handles for every portal route. Components never call each other; they only share
/// the registration store behind the service.
pub struct PortalState<R> {
    pub registrations: Arc<RegistrationService<R>>,
    pub lookups: Arc<LookupProxy>,
    pub gate: Arc<AdminGate>,
    pub pages: Arc<PageRenderer>,
}

impl<R> Clone for PortalState<R> {
    fn clone(&self) -> Self {
        Self {
            registrations: Arc::clone(&self.registrations),
            lookups: Arc::clone(&self.lookups),
            gate: Arc::clone(&self.gate),
            pages: Arc::clone(&self.pages),
        }
    }
}

impl<R> FromRef<PortalState<R>> for Arc<RegistrationService<R>> {
    fn from_ref(state: &PortalState<R>) -> Self {
        Arc::clone(&state.registrations)
    }
}

impl<R> FromRef<PortalState<R>> for Arc<LookupProxy> {
    fn from_ref(state: &PortalState<R>) -> Self {
        Arc::clone(&state.lookups)
    }
}

impl<R> FromRef<PortalState<R>> for Arc<AdminGate> {
    fn from_ref(state: &PortalState<R>) -> Self {
        Arc::clone(&state.gate)
    }
}

impl<R> FromRef<PortalState<R>> for Arc<PageRenderer> {
    fn from_ref(state: &PortalState<R>) -> Self {
        Arc::clone(&state.pages)
    }
}

/// Router builder exposing the whole registration portal.
pub fn portal_router<R>(state: PortalState<R>) -> Router
where
    R: RegistrationRepository + 'static,
{
    Router::new()
        .merge(public_routes::<R, PortalState<R>>())
        .merge(lookup_routes::<PortalState<R>>())
        .merge(session_routes::<PortalState<R>>())
        .merge(review_routes::<R, PortalState<R>>())
        .with_state(state)
}
