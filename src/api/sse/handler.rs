//! SSE handler

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use tracing::info;

use super::SubscriptionGuard;
use crate::api::websocket::{AppState, Subscription};
use crate::error::AppError;

/// GET /sse/ai/updates - snapshot stream as Server-Sent Events
pub async fn sse_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let Subscription { id, mut rx } = state.broadcaster.subscribe()?;
    let guard = SubscriptionGuard::new(Arc::clone(&state.broadcaster), id);

    info!(subscriber = %id, "sse subscriber connected");

    let stream = async_stream::stream! {
        // Dropped with the stream when the client goes away
        let _guard = guard;

        while let Some(frame) = rx.recv().await {
            yield Ok::<_, Infallible>(Event::default().event("snapshot").data(frame.json.as_str()));
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default().interval(Duration::from_secs(15))))
}
