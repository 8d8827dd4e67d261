//! SSE (Server-Sent Events) variant of the live-update stream
//!
//! For clients that cannot open a WebSocket. Carries the same JSON frames.
//!
//! ## Endpoints
//! - `GET /sse/ai/updates` - one `snapshot` event per tick

pub mod handler;

use std::sync::Arc;

use crate::api::websocket::{Broadcaster, SubscriberId};

/// Deregisters an SSE subscriber when its response stream is dropped
pub struct SubscriptionGuard {
    broadcaster: Arc<Broadcaster>,
    id: SubscriberId,
}

impl SubscriptionGuard {
    pub fn new(broadcaster: Arc<Broadcaster>, id: SubscriberId) -> Self {
        Self { broadcaster, id }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.broadcaster.deregister(self.id);
    }
}
