//! WebSocket connection handler

use std::fmt;
use std::sync::Arc;

use std::time::Duration;

use axum::{
    extract::{
        ws::rejection::WebSocketUpgradeRejection,
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{IntoResponse, Response},
};
use futures::{Sink, SinkExt, StreamExt};
use tokio::time::timeout;
use tracing::{debug, info};

use super::broadcaster::{Broadcaster, Subscription};
use super::state::AppState;
use crate::error::{AppError, BroadcastError};

/// WebSocket upgrade handler.
///
/// A stopped broadcaster is reported as `503` before the upgrade request is
/// even validated, and the subscriber is registered before the upgrade, so
/// clients never get an upgraded socket that never speaks. The connection
/// task is tracked in [`AppState`] so shutdown can wait for its Close frame.
pub async fn ws_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<Arc<AppState>>,
) -> Response {
    if !state.broadcaster.is_running() {
        return AppError::from(BroadcastError::ServiceUnavailable).into_response();
    }

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return rejection.into_response(),
    };

    let subscription = match state.broadcaster.subscribe() {
        Ok(subscription) => subscription,
        Err(e) => return AppError::from(e).into_response(),
    };
    let broadcaster = Arc::clone(&state.broadcaster);
    let connection = state.track_connection();

    ws.on_upgrade(move |socket| async move {
        handle_socket(socket, broadcaster, subscription).await;
        drop(connection);
    })
}

/// Why a connection task ended
#[derive(Debug)]
enum Disconnect {
    ClientClosed,
    ClientError(axum::Error),
    SendFailed(axum::Error),
    SendTimedOut,
    BroadcasterStopped,
    DroppedByFanOut,
}

impl fmt::Display for Disconnect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disconnect::ClientClosed => write!(f, "client closed"),
            Disconnect::ClientError(e) => write!(f, "client error: {}", e),
            Disconnect::SendFailed(e) => write!(f, "send failed: {}", e),
            Disconnect::SendTimedOut => write!(f, "send timed out"),
            Disconnect::BroadcasterStopped => write!(f, "broadcaster stopped"),
            Disconnect::DroppedByFanOut => write!(f, "dropped by fan-out"),
        }
    }
}

/// Why the snapshot queue ended. The queue also closes when the fan-out
/// gives up on a stalled subscriber while the loop keeps running.
fn queue_closed(broadcaster: &Broadcaster) -> Disconnect {
    if broadcaster.is_running() {
        Disconnect::DroppedByFanOut
    } else {
        Disconnect::BroadcasterStopped
    }
}

/// One socket write bounded by the send timeout
async fn send_bounded<S>(
    sender: &mut S,
    message: Message,
    send_timeout: Duration,
) -> Result<(), Disconnect>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    match timeout(send_timeout, sender.send(message)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(Disconnect::SendFailed(e)),
        Err(_) => Err(Disconnect::SendTimedOut),
    }
}

/// Pump snapshots to one WebSocket until either side goes away
async fn handle_socket(socket: WebSocket, broadcaster: Arc<Broadcaster>, subscription: Subscription) {
    let Subscription { id, mut rx } = subscription;
    let send_timeout = broadcaster.config().send_timeout;
    let (mut sender, mut receiver) = socket.split();

    info!(subscriber = %id, "live update connection opened");

    let reason = loop {
        tokio::select! {
            frame = rx.recv() => {
                let Some(frame) = frame else {
                    let closed = queue_closed(&broadcaster);
                    match send_bounded(&mut sender, Message::Close(None), send_timeout).await {
                        Ok(()) => break closed,
                        Err(failed) => break failed,
                    }
                };
                if let Err(failed) =
                    send_bounded(&mut sender, Message::Text(frame.json.clone()), send_timeout).await
                {
                    break failed;
                }
            }

            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(failed) =
                            send_bounded(&mut sender, Message::Pong(data), send_timeout).await
                        {
                            break failed;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break Disconnect::ClientClosed,
                    Some(Ok(_)) => {} // Clients are not expected to send anything
                    Some(Err(e)) => break Disconnect::ClientError(e),
                }
            }
        }
    };

    // The fan-out may have dropped this subscriber already; that is fine
    let was_registered = broadcaster.deregister(id);
    debug!(subscriber = %id, was_registered, "connection task finished");
    info!(subscriber = %id, reason = %reason, "live update connection closed");
}
