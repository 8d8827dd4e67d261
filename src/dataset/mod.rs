//! Dataset - static student table and the queries answered over it
//!
//! The table is fixed at process start and never mutated, so it is shared
//! between handlers behind a plain `Arc` with no lock.

use crate::error::QueryError;
use crate::types::{round1, ClassAggregate, Record};

/// Read-only student table
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Create a dataset from the given records
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// The five demo records served by default
    pub fn demo() -> Self {
        Self::new(vec![
            Record::new(1, "John Doe", "Form 4", 85, 92),
            Record::new(2, "Jane Smith", "Form 4", 92, 95),
            Record::new(3, "Mike Johnson", "Form 3", 78, 80),
            Record::new(4, "Sarah Williams", "Form 3", 65, 70),
            Record::new(5, "David Brown", "Form 2", 88, 90),
        ])
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Find a single record by id
    pub fn find(&self, id: u32) -> Result<&Record, QueryError> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| QueryError::StudentNotFound(id.to_string()))
    }

    /// Records belonging to a class (exact, case-sensitive match)
    pub fn class_members<'a>(&'a self, class_name: &'a str) -> impl Iterator<Item = &'a Record> {
        self.records.iter().filter(move |r| r.class_name == class_name)
    }

    /// Mean score and attendance over exactly one class's records
    pub fn class_aggregate(&self, class_name: &str) -> Result<ClassAggregate, QueryError> {
        let members: Vec<&Record> = self.class_members(class_name).collect();
        if members.is_empty() {
            return Err(QueryError::ClassNotFound(class_name.to_string()));
        }

        Ok(ClassAggregate {
            class_name: class_name.to_string(),
            student_count: members.len(),
            average_score: round1(mean(members.iter().map(|r| r.score))),
            average_attendance: round1(mean(members.iter().map(|r| r.attendance))),
        })
    }

    /// Mean score over the whole table, rounded to one decimal
    pub fn average_score(&self) -> f64 {
        round1(mean(self.records.iter().map(|r| r.score)))
    }

    /// Mean attendance over the whole table, rounded to one decimal
    pub fn average_attendance(&self) -> f64 {
        round1(mean(self.records.iter().map(|r| r.attendance)))
    }

    pub fn at_risk_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_at_risk()).count()
    }

    /// Highest scoring record (first one wins on ties)
    pub fn top_performer(&self) -> Option<&Record> {
        self.records
            .iter()
            .reduce(|best, r| if r.score > best.score { r } else { best })
    }

    /// Lowest scoring record (first one wins on ties)
    pub fn needs_attention(&self) -> Option<&Record> {
        self.records
            .iter()
            .reduce(|worst, r| if r.score < worst.score { r } else { worst })
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::demo()
    }
}

fn mean(values: impl Iterator<Item = u32>) -> f64 {
    let (sum, count) = values.fold((0u64, 0u64), |(sum, count), v| (sum + v as u64, count + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_existing_and_missing() {
        let dataset = Dataset::demo();
        assert_eq!(dataset.find(2).unwrap().name, "Jane Smith");
        assert_eq!(dataset.find(42), Err(QueryError::StudentNotFound("42".to_string())));
    }

    #[test]
    fn test_class_aggregate_uses_only_that_class() {
        let dataset = Dataset::demo();

        let form3 = dataset.class_aggregate("Form 3").unwrap();
        assert_eq!(form3.student_count, 2);
        assert_eq!(form3.average_score, 71.5);
        assert_eq!(form3.average_attendance, 75.0);

        let form4 = dataset.class_aggregate("Form 4").unwrap();
        assert_eq!(form4.average_score, 88.5);
        assert_eq!(form4.average_attendance, 93.5);
    }

    #[test]
    fn test_class_aggregate_empty_group() {
        let dataset = Dataset::demo();
        assert_eq!(
            dataset.class_aggregate("Form 1"),
            Err(QueryError::ClassNotFound("Form 1".to_string()))
        );
        // Matching is exact
        assert!(dataset.class_aggregate("form 4").is_err());
    }

    #[test]
    fn test_dashboard_figures() {
        let dataset = Dataset::demo();
        assert_eq!(dataset.len(), 5);
        assert_eq!(dataset.average_score(), 81.6);
        assert_eq!(dataset.average_attendance(), 85.4);
        assert_eq!(dataset.at_risk_count(), 1);
        assert_eq!(dataset.top_performer().unwrap().name, "Jane Smith");
        assert_eq!(dataset.needs_attention().unwrap().name, "Sarah Williams");
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::new(Vec::new());
        assert!(dataset.is_empty());
        assert_eq!(dataset.average_score(), 0.0);
        assert!(dataset.top_performer().is_none());
    }
}
