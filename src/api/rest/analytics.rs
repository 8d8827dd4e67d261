//! Class analytics endpoint

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::api::websocket::state::AppState;
use crate::error::AppError;
use crate::types::ClassAggregate;

const CLASS_RECOMMENDATIONS: [&str; 3] = [
    "Organize group study sessions",
    "Schedule extra classes",
    "Implement peer tutoring",
];

/// Response for GET /api/analytics/class/:class_name
#[derive(Debug, Serialize)]
pub struct ClassAnalytics {
    #[serde(flatten)]
    pub aggregate: ClassAggregate,
    pub recommendations: Vec<&'static str>,
}

/// GET /api/analytics/class/:class_name - Averages over one class
pub async fn class_analytics(
    State(state): State<Arc<AppState>>,
    Path(class_name): Path<String>,
) -> Result<Json<ClassAnalytics>, AppError> {
    let aggregate = state.dataset.class_aggregate(&class_name)?;

    Ok(Json(ClassAnalytics {
        aggregate,
        recommendations: CLASS_RECOMMENDATIONS.to_vec(),
    }))
}
