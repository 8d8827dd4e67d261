//! WebSocket module for live analytics updates
//!
//! Provides the WebSocket endpoint at `/ws/ai/updates` and the broadcaster
//! that feeds it (and the SSE variant) one snapshot per period.
//!
//! ## Features
//! - Explicitly owned subscriber set behind one lock
//! - Per-subscriber bounded queues with send timeouts
//! - Failed or stalled subscribers dropped without disturbing the others
//! - Deterministic shutdown: no tick after `shutdown`, in-flight sends drain

pub mod broadcaster;
pub mod events;
pub mod handler;
pub mod state;
pub mod telemetry;
pub mod ticker;

// Re-export commonly used items
pub use broadcaster::{Broadcaster, LoopState, SubscriberId, Subscription};
pub use events::{Snapshot, SnapshotFrame};
pub use state::AppState;
pub use telemetry::{RandomTelemetry, Telemetry, TelemetryError, TelemetrySource};
