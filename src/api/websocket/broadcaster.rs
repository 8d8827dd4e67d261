//! Live-update broadcaster
//!
//! Owns the subscriber set and fans each tick's snapshot out to every
//! registered subscriber.
//!
//! # Design
//!
//! The subscriber set, the loop state and the identity counter live behind a
//! single `parking_lot::Mutex` that is never held across an `.await`. A
//! fan-out copies the sending halves out under the lock, releases it, sends
//! concurrently with a per-send timeout, and only then deregisters the
//! subscribers whose sends failed. Identities are never reused, so a late
//! `deregister` can only ever remove the subscriber it was issued for.
//!
//! Each subscriber is a bounded `mpsc` queue whose receiving half is owned by
//! the connection task (WebSocket or SSE) that writes to the socket.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc::{self, error::SendTimeoutError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::events::{Snapshot, SnapshotFrame, SYSTEM_HEALTH};
use super::telemetry::TelemetrySource;
use super::ticker::Ticker;
use crate::config::BroadcastConfig;
use crate::error::{BroadcastError, BroadcastResult, TransmitFailure};

/// Unique identity of a registered subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SubscriberId(pub u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type FrameSender = mpsc::Sender<Arc<SnapshotFrame>>;
pub type FrameReceiver = mpsc::Receiver<Arc<SnapshotFrame>>;

/// Lifecycle of the timer loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopState {
    Running,
    Stopped,
}

/// A registered subscriber's receiving half
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriberId,
    pub rx: FrameReceiver,
}

struct Subscriber {
    tx: FrameSender,
    registered_at: Instant,
}

struct SubscriberSet {
    state: LoopState,
    next_id: u64,
    entries: HashMap<SubscriberId, Subscriber>,
}

/// Periodic snapshot broadcaster
pub struct Broadcaster {
    config: BroadcastConfig,
    telemetry: Arc<dyn TelemetrySource>,
    subscribers: Mutex<SubscriberSet>,
    sequence_counter: AtomicU64,
    last_timestamp: Mutex<Option<DateTime<Utc>>>,
    shutdown_tx: watch::Sender<bool>,
}

impl Broadcaster {
    /// Create a broadcaster in the `Running` state without starting its loop
    pub fn new(config: BroadcastConfig, telemetry: Arc<dyn TelemetrySource>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            config,
            telemetry,
            subscribers: Mutex::new(SubscriberSet {
                state: LoopState::Running,
                next_id: 1,
                entries: HashMap::new(),
            }),
            sequence_counter: AtomicU64::new(0),
            last_timestamp: Mutex::new(None),
            shutdown_tx,
        }
    }

    /// Create a broadcaster and start its timer loop on the current runtime.
    ///
    /// The handle resolves when the loop stops: `Ok(())` after `shutdown`,
    /// `Err(BroadcastError::Fault)` after an unrecoverable fault.
    pub fn spawn(
        config: BroadcastConfig,
        telemetry: Arc<dyn TelemetrySource>,
    ) -> (Arc<Self>, JoinHandle<BroadcastResult<()>>) {
        let broadcaster = Arc::new(Self::new(config, telemetry));
        let ticker = Ticker::new(Arc::clone(&broadcaster));
        let handle = tokio::spawn(ticker.run());
        (broadcaster, handle)
    }

    pub fn config(&self) -> &BroadcastConfig {
        &self.config
    }

    pub fn state(&self) -> LoopState {
        self.subscribers.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == LoopState::Running
    }

    /// Momentary size of the subscriber set
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().entries.len()
    }

    pub fn is_registered(&self, id: SubscriberId) -> bool {
        self.subscribers.lock().entries.contains_key(&id)
    }

    /// Register a connection's sending half and assign it an identity
    pub fn register(&self, tx: FrameSender) -> BroadcastResult<SubscriberId> {
        let mut set = self.subscribers.lock();
        if set.state == LoopState::Stopped {
            return Err(BroadcastError::ServiceUnavailable);
        }

        let id = SubscriberId(set.next_id);
        set.next_id += 1;
        set.entries.insert(
            id,
            Subscriber {
                tx,
                registered_at: Instant::now(),
            },
        );
        let count = set.entries.len();
        drop(set);

        info!(subscriber = %id, subscribers = count, "subscriber registered");
        Ok(id)
    }

    /// Create a queue sized by the config and register it
    pub fn subscribe(&self) -> BroadcastResult<Subscription> {
        let (tx, rx) = mpsc::channel(self.config.subscriber_buffer);
        let id = self.register(tx)?;
        Ok(Subscription { id, rx })
    }

    /// Remove a subscriber. Returns `false` if it was already gone.
    pub fn deregister(&self, id: SubscriberId) -> bool {
        let mut set = self.subscribers.lock();
        let removed = set.entries.remove(&id);
        let count = set.entries.len();
        drop(set);

        match removed {
            Some(subscriber) => {
                info!(
                    subscriber = %id,
                    subscribers = count,
                    connected_ms = subscriber.registered_at.elapsed().as_millis() as u64,
                    "subscriber deregistered"
                );
                true
            }
            None => false,
        }
    }

    /// Stop the loop and reject further registrations.
    ///
    /// The subscriber set is cleared in the same critical section that flips
    /// the state, dropping its sending halves. A fan-out already in flight
    /// finishes its sends (each still bounded by the send timeout); after
    /// that every connection observes end-of-stream. Idempotent.
    pub fn shutdown(&self) {
        if self.stop() {
            info!("live updates shut down");
        }
    }

    /// Returns `true` if this call performed the transition
    pub(crate) fn stop(&self) -> bool {
        let mut set = self.subscribers.lock();
        if set.state == LoopState::Stopped {
            return false;
        }
        set.state = LoopState::Stopped;
        let dropped = set.entries.len();
        set.entries.clear();
        drop(set);

        self.shutdown_tx.send_replace(true);
        debug!(dropped, "subscriber set cleared");
        true
    }

    pub(crate) fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Compute and encode one snapshot
    pub(crate) fn tick(&self) -> BroadcastResult<SnapshotFrame> {
        let telemetry = self.telemetry.sample()?;
        let active_sessions = self.subscriber_count();

        let timestamp = {
            let mut last = self.last_timestamp.lock();
            let now = Utc::now();
            // Wall clock may step backwards; keep per-subscriber order non-decreasing
            let ts = match *last {
                Some(prev) if prev > now => prev,
                _ => now,
            };
            *last = Some(ts);
            ts
        };

        let snapshot = Snapshot {
            timestamp,
            sequence_id: self.sequence_counter.fetch_add(1, Ordering::SeqCst),
            active_sessions,
            predictions_processed: telemetry.predictions_processed,
            alerts: telemetry.alerts,
            system_health: SYSTEM_HEALTH.to_string(),
        };

        SnapshotFrame::encode(snapshot).map_err(|e| BroadcastError::Computation(e.to_string()))
    }

    /// Deliver one frame to every subscriber registered at enumeration time
    pub(crate) async fn broadcast(&self, frame: SnapshotFrame) {
        let frame = Arc::new(frame);

        let targets: Vec<(SubscriberId, FrameSender)> = {
            let set = self.subscribers.lock();
            set.entries
                .iter()
                .map(|(id, subscriber)| (*id, subscriber.tx.clone()))
                .collect()
        };

        if targets.is_empty() {
            debug!(sequence_id = frame.snapshot.sequence_id, "no subscribers");
            return;
        }

        let send_timeout = self.config.send_timeout;
        let attempts = targets.into_iter().map(|(id, tx)| {
            let frame = Arc::clone(&frame);
            async move { (id, transmit(&tx, frame, send_timeout).await) }
        });
        let outcomes = join_all(attempts).await;

        let mut delivered = 0usize;
        let mut failed = 0usize;
        for (id, outcome) in outcomes {
            match outcome {
                Ok(()) => delivered += 1,
                Err(reason) => {
                    failed += 1;
                    let err = BroadcastError::Transmission { id, reason };
                    warn!(error = %err, "dropping subscriber");
                    self.deregister(id);
                }
            }
        }

        debug!(
            sequence_id = frame.snapshot.sequence_id,
            delivered, failed, "snapshot fanned out"
        );
    }

    /// Current tick sequence ID (the next snapshot's `sequence_id`)
    pub fn current_sequence_id(&self) -> u64 {
        self.sequence_counter.load(Ordering::SeqCst)
    }
}

async fn transmit(
    tx: &FrameSender,
    frame: Arc<SnapshotFrame>,
    send_timeout: Duration,
) -> Result<(), TransmitFailure> {
    tx.send_timeout(frame, send_timeout)
        .await
        .map_err(|err| match err {
            SendTimeoutError::Timeout(_) => TransmitFailure::Timeout,
            SendTimeoutError::Closed(_) => TransmitFailure::Closed,
        })
}
