//! Data types for the EduTrack analytics service
//!
//! This module contains the record table row and the value types derived from it.

mod analysis;
mod record;

pub use analysis::{round1, ClassAggregate, PerformanceTrend, RiskLevel};
pub use record::Record;
