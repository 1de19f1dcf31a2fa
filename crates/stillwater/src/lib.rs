//! Stillwater: a REST backend for publishing guided wellness sessions.
//!
//! Authenticated users write sessions as drafts, publish them, and manage
//! them; anyone can browse and search what is published.

pub mod app;
pub mod auth;
pub mod config;
pub mod controllers;
pub mod db;
pub mod error;
pub mod extractors;
pub mod ids;
pub mod lifecycle;
pub mod logging;
pub mod migrations;
pub mod models;
pub mod openapi;
pub mod repository;
pub mod response;
pub mod routing;
pub mod testing;
pub mod validation;

pub use app::App;
pub use config::Config;
pub use error::ApiError;
pub use response::ApiResponse;
pub use testing::{TestApp, TestClient, TestResponse};
