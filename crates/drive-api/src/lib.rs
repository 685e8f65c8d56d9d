//! # drive-api
//!
//! HTTP API layer for the personal drive built on Axum.
//!
//! Provides the `/api/drive` REST endpoints, the acting-user extractor,
//! validated DTOs, middleware (logging, CORS), and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, serve};
pub use error::{ApiError, ApiResult};
pub use state::AppState;
