//! Event registration portal: public intake form, CNPJ/CEP lookup proxy and the admin
//! review panel, served over axum and persisted in SQLite.

pub mod admin;
pub mod config;
pub mod error;
pub mod lookup;
pub mod pages;
pub mod portal;
pub mod registrations;
pub mod telemetry;
