//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::rest::{ai, analytics, dashboard, students};
use super::sse::handler::sse_handler;
use super::websocket::{handler::ws_handler, state::AppState, LoopState};

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration - allow all origins for the dashboard frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(home))
        .route("/api/health", get(health_check))
        // Query service
        .route("/api/dashboard/stats", get(dashboard::get_stats))
        .route("/api/students", get(students::list_students))
        .route("/api/ai/analyze/:student_id", get(ai::analyze_student))
        .route("/api/ai/predict-batch", post(ai::predict_batch))
        .route("/api/analytics/class/:class_name", get(analytics::class_analytics))
        // Live updates
        .route("/ws/ai/updates", get(ws_handler))
        .route("/sse/ai/updates", get(sse_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub message: &'static str,
    pub status: &'static str,
    pub version: &'static str,
}

/// Service banner
async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        message: "EduTrack AI Pro API",
        status: "running",
        version: crate::VERSION,
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub live_updates: LiveUpdatesHealth,
}

#[derive(Debug, Serialize)]
pub struct LiveUpdatesHealth {
    pub state: LoopState,
    pub subscribers: usize,
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        live_updates: LiveUpdatesHealth {
            state: state.broadcaster.state(),
            subscribers: state.broadcaster.subscriber_count(),
        },
    })
}
