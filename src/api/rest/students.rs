//! Student listing endpoint

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::websocket::state::AppState;
use crate::types::Record;

/// Response for GET /api/students
#[derive(Debug, Serialize)]
pub struct StudentsResponse {
    pub students: Vec<Record>,
    pub count: usize,
    pub summary: StudentsSummary,
}

#[derive(Debug, Serialize)]
pub struct StudentsSummary {
    pub top_performer: Option<String>,
    pub needs_attention: Option<String>,
}

/// GET /api/students - List every record
pub async fn list_students(State(state): State<Arc<AppState>>) -> Json<StudentsResponse> {
    let dataset = &state.dataset;

    Json(StudentsResponse {
        students: dataset.records().to_vec(),
        count: dataset.len(),
        summary: StudentsSummary {
            top_performer: dataset.top_performer().map(|r| r.name.clone()),
            needs_attention: dataset.needs_attention().map(|r| r.name.clone()),
        },
    })
}
