//! Admin session gate: password login, signed session cookie and the extractors guarding
//! every review operation.

pub mod gate;
pub mod router;
pub mod session;

pub use gate::{AdminGate, SessionClaims, SessionError};
pub use router::session_routes;
pub use session::{AdminSession, SessionContext, DASHBOARD_PATH, LOGIN_PATH, SESSION_COOKIE};
