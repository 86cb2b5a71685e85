//! # HTTP Request Handlers
//!
//! - `health`: Health check endpoint (for monitoring)
//! - `auth`: Logout
//! - `pages`: Login, second-factor and dashboard pages
//! - `users`: API user profile

pub mod auth;
pub mod health;
pub mod pages;
pub mod users;
