//! Risk analysis endpoints

use std::num::IntErrorKind;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::debug;

use crate::api::websocket::state::AppState;
use crate::error::{AppError, QueryError};
use crate::scoring::predicted_next_term;
use crate::types::{PerformanceTrend, Record, RiskLevel};

/// Confidence reported alongside every risk score
pub const RISK_CONFIDENCE: f64 = 0.85;

const RISK_RECOMMENDATIONS: [&str; 3] = [
    "Schedule parent meeting",
    "Assign peer mentor",
    "Extra tutoring sessions",
];

const PERFORMANCE_RECOMMENDATIONS: [&str; 3] = [
    "Focus on Mathematics practice",
    "Join study group",
    "Watch tutorial videos",
];

/// Response for GET /api/ai/analyze/:student_id
#[derive(Debug, Serialize)]
pub struct StudentAnalysis {
    pub student_info: Record,
    pub dropout_risk_analysis: DropoutRiskAnalysis,
    pub performance_analysis: PerformanceAnalysis,
}

#[derive(Debug, Serialize)]
pub struct DropoutRiskAnalysis {
    pub risk_score: f64,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct PerformanceAnalysis {
    pub current_average: u32,
    pub trend: PerformanceTrend,
    pub predicted_next_term: f64,
    pub recommendations: Vec<&'static str>,
}

/// Parse the path segment of an analyze request.
///
/// Any integer is a valid key, so negative or oversized ids come back as
/// `Ok(None)` (no such record) rather than a parse failure.
fn parse_student_id(raw: &str) -> Result<Option<u32>, AppError> {
    match raw.parse::<i64>() {
        Ok(id) => Ok(u32::try_from(id).ok()),
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Ok(None)
        }
        Err(_) => Err(AppError::BadRequest(format!("Invalid student id: {}", raw))),
    }
}

/// GET /api/ai/analyze/:student_id - Analysis for one record
pub async fn analyze_student(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<StudentAnalysis>, AppError> {
    let record = match parse_student_id(&raw_id)? {
        Some(id) => state.dataset.find(id)?,
        None => return Err(QueryError::StudentNotFound(raw_id).into()),
    };
    let risk_score = state.score(record);

    Ok(Json(StudentAnalysis {
        student_info: record.clone(),
        dropout_risk_analysis: DropoutRiskAnalysis {
            risk_score,
            confidence: RISK_CONFIDENCE,
            risk_level: RiskLevel::from_score(risk_score),
            recommendations: RISK_RECOMMENDATIONS.to_vec(),
        },
        performance_analysis: PerformanceAnalysis {
            current_average: record.score,
            trend: PerformanceTrend::from_score(record.score),
            predicted_next_term: predicted_next_term(record),
            recommendations: PERFORMANCE_RECOMMENDATIONS.to_vec(),
        },
    }))
}

/// One entry of a batch prediction
#[derive(Debug, Serialize)]
pub struct Prediction {
    pub student_id: u32,
    pub student_name: String,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
}

/// Count of predictions per risk level
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct RiskSummary {
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
}

impl RiskSummary {
    fn count(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::High => self.high_risk += 1,
            RiskLevel::Medium => self.medium_risk += 1,
            RiskLevel::Low => self.low_risk += 1,
        }
    }
}

/// Response for POST /api/ai/predict-batch
#[derive(Debug, Serialize)]
pub struct BatchPrediction {
    pub predictions: Vec<Prediction>,
    pub summary: RiskSummary,
}

/// POST /api/ai/predict-batch - Score every record
pub async fn predict_batch(State(state): State<Arc<AppState>>) -> Json<BatchPrediction> {
    let mut summary = RiskSummary::default();

    let predictions: Vec<Prediction> = state
        .dataset
        .records()
        .iter()
        .map(|record| {
            let risk_score = state.score(record);
            let risk_level = RiskLevel::from_score(risk_score);
            summary.count(risk_level);
            Prediction {
                student_id: record.id,
                student_name: record.name.clone(),
                risk_score,
                risk_level,
            }
        })
        .collect();

    debug!(count = predictions.len(), "batch prediction served");

    Json(BatchPrediction {
        predictions,
        summary,
    })
}
