//! Dashboard statistics endpoint

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::websocket::state::AppState;

/// Response for GET /api/dashboard/stats
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_students: usize,
    pub average_score: f64,
    pub average_attendance: f64,
    pub performance_trend: &'static str,
    pub at_risk_students: usize,
    pub ai_predictions_made: u64,
    pub timestamp: DateTime<Utc>,
}

/// GET /api/dashboard/stats - Table-wide figures
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<DashboardStats> {
    let dataset = &state.dataset;

    Json(DashboardStats {
        total_students: dataset.len(),
        average_score: dataset.average_score(),
        average_attendance: dataset.average_attendance(),
        performance_trend: "improving",
        at_risk_students: dataset.at_risk_count(),
        ai_predictions_made: state.predictions_made(),
        timestamp: Utc::now(),
    })
}
