//! Risk scoring
//!
//! Scoring sits behind [`RiskScorer`] so a trained model can replace the
//! synthetic default without touching the handlers or the broadcaster.

use crate::types::{PerformanceTrend, Record};

/// Lower and upper bound of any risk score
pub const RISK_FLOOR: f64 = 0.1;
pub const RISK_CEILING: f64 = 0.9;

/// Maps a record to a dropout risk score in `[RISK_FLOOR, RISK_CEILING]`
pub trait RiskScorer: Send + Sync {
    fn risk_score(&self, record: &Record) -> f64;
}

/// Synthetic scorer: risk grows with the shortfall of a weighted
/// score/attendance blend from 100.
///
/// `risk = (100 - (w_s * score + w_a * attendance)) / 50`, clamped.
#[derive(Debug, Clone, Copy)]
pub struct WeightedRiskScorer {
    pub score_weight: f64,
    pub attendance_weight: f64,
}

impl Default for WeightedRiskScorer {
    fn default() -> Self {
        Self {
            score_weight: 0.6,
            attendance_weight: 0.4,
        }
    }
}

impl RiskScorer for WeightedRiskScorer {
    fn risk_score(&self, record: &Record) -> f64 {
        let blended = self.score_weight * record.score as f64
            + self.attendance_weight * record.attendance as f64;
        ((100.0 - blended) / 50.0).clamp(RISK_FLOOR, RISK_CEILING)
    }
}

/// Projected next-term score: current score shifted by the trend, capped at 100
pub fn predicted_next_term(record: &Record) -> f64 {
    let trend = PerformanceTrend::from_score(record.score);
    (record.score as f64 + trend.projected_delta()).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::types::RiskLevel;

    #[test]
    fn test_weighted_scorer_on_demo_table() {
        let scorer = WeightedRiskScorer::default();
        let dataset = Dataset::demo();

        let levels: Vec<RiskLevel> = dataset
            .records()
            .iter()
            .map(|r| RiskLevel::from_score(scorer.risk_score(r)))
            .collect();

        // Mike Johnson (78/80) and Sarah Williams (65/70) are the medium-risk rows
        assert_eq!(
            levels,
            vec![
                RiskLevel::Low,
                RiskLevel::Low,
                RiskLevel::Medium,
                RiskLevel::Medium,
                RiskLevel::Low,
            ]
        );
    }

    #[test]
    fn test_scores_are_clamped() {
        let scorer = WeightedRiskScorer::default();
        let perfect = Record::new(1, "A", "X", 100, 100);
        let absent = Record::new(2, "B", "X", 0, 0);
        assert_eq!(scorer.risk_score(&perfect), RISK_FLOOR);
        assert_eq!(scorer.risk_score(&absent), RISK_CEILING);
    }

    #[test]
    fn test_predicted_next_term() {
        assert_eq!(predicted_next_term(&Record::new(1, "A", "X", 85, 90)), 87.5);
        assert_eq!(predicted_next_term(&Record::new(2, "B", "X", 75, 90)), 75.0);
        assert_eq!(predicted_next_term(&Record::new(3, "C", "X", 65, 90)), 62.5);
        assert_eq!(predicted_next_term(&Record::new(4, "D", "X", 99, 90)), 100.0);
    }
}
