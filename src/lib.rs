//! Bearer token verification for user pool issued JWTs.
//!
//! `services::auth` holds the verification core and has no HTTP dependency.
//! `middleware::auth::access` adapts it to axum: header lookup, rejection with
//! 401 + `WWW-Authenticate`, and handing verified claims to handlers.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
