//! Telemetry sources sampled once per tick

use rand::Rng;
use thiserror::Error;

use crate::error::BroadcastError;

/// Counters carried by a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Telemetry {
    pub predictions_processed: u32,
    pub alerts: u32,
}

/// Why a telemetry sample could not be taken
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TelemetryError {
    /// Transient; the current tick is skipped
    #[error("telemetry unavailable: {0}")]
    Unavailable(String),

    /// The source cannot recover; the loop stops
    #[error("telemetry fault: {0}")]
    Fault(String),
}

impl From<TelemetryError> for BroadcastError {
    fn from(err: TelemetryError) -> Self {
        match err {
            TelemetryError::Unavailable(_) => BroadcastError::Computation(err.to_string()),
            TelemetryError::Fault(_) => BroadcastError::Fault(err.to_string()),
        }
    }
}

/// Source of the advisory counters in each snapshot
pub trait TelemetrySource: Send + Sync {
    fn sample(&self) -> Result<Telemetry, TelemetryError>;
}

/// Placeholder counters drawn uniformly at random.
///
/// `predictions_processed` is in `100..500`, `alerts` in `0..3`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTelemetry;

impl TelemetrySource for RandomTelemetry {
    fn sample(&self) -> Result<Telemetry, TelemetryError> {
        let mut rng = rand::thread_rng();
        Ok(Telemetry {
            predictions_processed: rng.gen_range(100..500),
            alerts: rng.gen_range(0..3),
        })
    }
}

/// Always reports the same counters
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedTelemetry(pub Telemetry);

#[cfg(test)]
impl TelemetrySource for FixedTelemetry {
    fn sample(&self) -> Result<Telemetry, TelemetryError> {
        Ok(self.0)
    }
}
