//! Shared application state

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::time::timeout;
use tokio_util::task::{task_tracker::TaskTrackerToken, TaskTracker};
use tracing::warn;

use super::broadcaster::Broadcaster;
use crate::dataset::Dataset;
use crate::scoring::RiskScorer;
use crate::types::Record;

/// State shared by every HTTP and WebSocket handler
pub struct AppState {
    /// The static record table
    pub dataset: Arc<Dataset>,

    /// Risk scoring used by the analysis endpoints
    pub scorer: Arc<dyn RiskScorer>,

    /// Live-update broadcaster
    pub broadcaster: Arc<Broadcaster>,

    /// Records scored since startup
    predictions_made: AtomicU64,

    /// Open WebSocket connection tasks, drained on shutdown
    connections: TaskTracker,
}

impl AppState {
    pub fn new(
        dataset: Arc<Dataset>,
        scorer: Arc<dyn RiskScorer>,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        Self {
            dataset,
            scorer,
            broadcaster,
            predictions_made: AtomicU64::new(0),
            connections: TaskTracker::new(),
        }
    }

    /// Score a record and count the prediction
    pub fn score(&self, record: &Record) -> f64 {
        self.predictions_made.fetch_add(1, Ordering::Relaxed);
        self.scorer.risk_score(record)
    }

    pub fn predictions_made(&self) -> u64 {
        self.predictions_made.load(Ordering::Relaxed)
    }

    /// Count a connection as open until the returned token is dropped
    pub fn track_connection(&self) -> TaskTrackerToken {
        self.connections.token()
    }

    pub fn open_connections(&self) -> usize {
        self.connections.len()
    }

    /// Wait for open connections to flush and close after shutdown.
    ///
    /// Bounded by [`BroadcastConfig::drain_timeout`]; returns `false` if some
    /// connections were still open when it ran out.
    ///
    /// [`BroadcastConfig::drain_timeout`]: crate::config::BroadcastConfig::drain_timeout
    pub async fn drain_connections(&self) -> bool {
        self.connections.close();
        let limit = self.broadcaster.config().drain_timeout();

        match timeout(limit, self.connections.wait()).await {
            Ok(()) => true,
            Err(_) => {
                warn!(
                    open = self.connections.len(),
                    "connections still open after drain timeout"
                );
                false
            }
        }
    }
}
