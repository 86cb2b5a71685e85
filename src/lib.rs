//! # Helpdesk Gate
//!
//! Request gates for the helpdesk web application: database readiness,
//! session login rules, the two-factor (TOTP) gate, API access tokens and
//! cache headers, wired into an axum router.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod state;
pub mod viewdata;

#[cfg(test)]
mod testing;
