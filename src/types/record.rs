//! Student record type

use serde::{Deserialize, Serialize};

/// One row of the static student table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: u32,
    pub name: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub score: u32,
    pub attendance: u32,
}

impl Record {
    /// Create a new record
    pub fn new(id: u32, name: &str, class_name: &str, score: u32, attendance: u32) -> Self {
        Self {
            id,
            name: name.to_string(),
            class_name: class_name.to_string(),
            score,
            attendance,
        }
    }

    /// Records scoring below this are counted as at risk on the dashboard
    pub const AT_RISK_SCORE: u32 = 70;

    pub fn is_at_risk(&self) -> bool {
        self.score < Self::AT_RISK_SCORE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_class_field() {
        let record = Record::new(1, "John Doe", "Form 4", 85, 92);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["class"], "Form 4");
        assert!(json.get("class_name").is_none());
    }

    #[test]
    fn test_at_risk_threshold() {
        assert!(Record::new(4, "Sarah Williams", "Form 3", 65, 70).is_at_risk());
        assert!(!Record::new(3, "Mike Johnson", "Form 3", 70, 80).is_at_risk());
    }
}
