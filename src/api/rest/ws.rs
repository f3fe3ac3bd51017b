use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures::{SinkExt, Stream, StreamExt};
use serde::Serialize;
use tokio_stream::wrappers::{BroadcastStream, WatchStream};
use tracing::{info, warn};

use crate::state::AppState;

/// Every booking event of every session.
pub async fn events_ws(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let events = BroadcastStream::new(state.booking_events_tx.subscribe())
        .filter_map(|event| futures::future::ready(event.ok()));

    ws.on_upgrade(|socket| forward_json(socket, Box::pin(events), "events"))
}

/// The session's current booking, re-sent whenever it changes.
pub async fn current_booking_ws(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let current = WatchStream::new(state.session(&user_id).subscribe_current());

    ws.on_upgrade(|socket| forward_json(socket, Box::pin(current), "current-booking"))
}

async fn forward_json<S, T>(socket: WebSocket, mut updates: S, feed: &'static str)
where
    S: Stream<Item = T> + Unpin + Send + 'static,
    T: Serialize + Send + 'static,
{
    let (mut sender, mut receiver) = socket.split();

    info!(feed, "websocket client connected");

    let send_task = tokio::spawn(async move {
        while let Some(update) = updates.next().await {
            let json = match serde_json::to_string(&update) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to serialize update for ws");
                    continue;
                }
            };

            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let recv_task = tokio::spawn(async move {
        while let Some(Ok(_msg)) = receiver.next().await {}
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    info!(feed, "websocket client disconnected");
}
