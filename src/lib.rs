//! My Jet Backend Library
//!
//! Cookie-authenticated booking API. Exposes every module so the binary
//! and the integration tests share one router.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod middleware;
pub mod tickets;

pub use app::{build_router, AppState};
pub use config::Config;
