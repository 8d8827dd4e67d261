//! Snapshot payloads pushed to live-update subscribers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health string reported in every snapshot
pub const SYSTEM_HEALTH: &str = "optimal";

/// Immutable value computed once per tick
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the tick ran (RFC 3339, never earlier than the previous tick)
    pub timestamp: DateTime<Utc>,

    /// Monotonically increasing tick counter for gap detection
    pub sequence_id: u64,

    /// Subscriber count observed while computing the tick (advisory)
    pub active_sessions: usize,

    /// Advisory telemetry counters
    pub predictions_processed: u32,
    pub alerts: u32,

    pub system_health: String,
}

/// A snapshot together with its single JSON encoding.
///
/// Every subscriber of a tick is handed the same `Arc<SnapshotFrame>`, so the
/// bytes on the wire are identical across subscribers.
#[derive(Debug)]
pub struct SnapshotFrame {
    pub snapshot: Snapshot,
    pub json: String,
}

impl SnapshotFrame {
    pub fn encode(snapshot: Snapshot) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_string(&snapshot)?;
        Ok(Self { snapshot, json })
    }
}
