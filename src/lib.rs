//! EduTrack analytics service
//!
//! A small student-analytics API over a static table, plus a live-update
//! stream that pushes a telemetry snapshot to every connected client once per
//! period.
//!
//! # Modules
//!
//! - `types`: Record and analysis value types
//! - `dataset`: The static table and the queries answered over it
//! - `scoring`: Pluggable risk scoring
//! - `api`: HTTP router, REST handlers, WebSocket/SSE streams and the broadcaster
//! - `config`: Command line / environment configuration
//! - `error`: Error types
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use edutrack::api::http::create_router;
//! use edutrack::api::websocket::{AppState, Broadcaster, RandomTelemetry};
//! use edutrack::{BroadcastConfig, Dataset, WeightedRiskScorer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (broadcaster, _loop) =
//!         Broadcaster::spawn(BroadcastConfig::default(), Arc::new(RandomTelemetry));
//!     let state = Arc::new(AppState::new(
//!         Arc::new(Dataset::demo()),
//!         Arc::new(WeightedRiskScorer::default()),
//!         broadcaster,
//!     ));
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await.unwrap();
//!     axum::serve(listener, create_router(state)).await.unwrap();
//! }
//! ```

pub mod api;
pub mod config;
pub mod dataset;
pub mod error;
pub mod scoring;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{Args, BroadcastConfig, ServerConfig};
pub use dataset::Dataset;
pub use error::{AppError, BroadcastError, QueryError};
pub use scoring::{RiskScorer, WeightedRiskScorer};
pub use types::{ClassAggregate, PerformanceTrend, Record, RiskLevel};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
