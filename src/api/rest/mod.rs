//! REST API module for the query service
//!
//! Stateless handlers over the static record table:
//! - `GET /api/dashboard/stats` - Table-wide figures
//! - `GET /api/students` - All records with a short summary
//! - `GET /api/ai/analyze/:student_id` - Risk and performance analysis for one record
//! - `POST /api/ai/predict-batch` - Risk scores for every record
//! - `GET /api/analytics/class/:class_name` - Aggregate for one class

pub mod ai;
pub mod analytics;
pub mod dashboard;
pub mod students;
