//! Axum HTTP API server for CrowdLens.
//!
//! This crate provides:
//! - The `/analyze` ingestion endpoint (frame + person detections in,
//!   demographic counters out)
//! - Dashboard chart endpoints over the same aggregation store
//! - Rate-of-ingest dedup of tracked persons
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{DedupCache, FramePipeline};
pub use state::AppState;
