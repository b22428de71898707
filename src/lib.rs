// src/lib.rs
// Public library surface for the server binary, newsctl and integration tests.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod model;
pub mod services;
pub mod state;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::create_router;
pub use crate::config::AppConfig;
pub use crate::error::ApiError;
pub use crate::ingest::{IngestJob, IngestReport, IngestService};
pub use crate::model::{Article, Category, PublicUser, Role, User};
pub use crate::state::AppState;
