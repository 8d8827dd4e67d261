//! Analysis value types: risk levels, trends and class aggregates

use serde::{Deserialize, Serialize};

/// Dropout risk bucket derived from a risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// Bucket a risk score: above 0.7 is high, above 0.4 is medium
    pub fn from_score(risk_score: f64) -> Self {
        if risk_score > 0.7 {
            RiskLevel::High
        } else if risk_score > 0.4 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Performance trend derived from the current score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceTrend {
    Improving,
    Stable,
    Declining,
}

impl PerformanceTrend {
    pub fn from_score(score: u32) -> Self {
        if score > 80 {
            PerformanceTrend::Improving
        } else if score > 70 {
            PerformanceTrend::Stable
        } else {
            PerformanceTrend::Declining
        }
    }

    /// Points added to the current score when projecting next term
    pub fn projected_delta(self) -> f64 {
        match self {
            PerformanceTrend::Improving => 2.5,
            PerformanceTrend::Stable => 0.0,
            PerformanceTrend::Declining => -2.5,
        }
    }
}

/// Aggregate over the records of one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassAggregate {
    #[serde(rename = "class")]
    pub class_name: String,
    pub student_count: usize,
    pub average_score: f64,
    pub average_attendance: f64,
}

/// Round to one decimal place, halves to even (`80.25` becomes `80.2`)
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}
