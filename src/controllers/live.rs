//! Live channel (`GET /ws`).
//!
//! Every frame is JSON text `{"event": ..., "data": ...}`. The server pushes
//! `seat-updated` and `seats-reset` for all days to every observer; a client
//! asks for a snapshot with `{"event": "get-seats", "data": <dayId>}` and gets
//! `seats-data` back on the same connection.
//!
//! Changes already queued for a connection when it reads a snapshot may be
//! older than that snapshot; those are skipped so a seat never moves back.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::broadcast::{Broadcast, LiveEvent};
use crate::AppState;

/// Client → server frames.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
enum ClientEvent {
    GetSeats(i32),
}

#[derive(Debug, Error)]
enum SendError {
    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("socket closed: {0}")]
    Socket(Box<dyn std::error::Error + Send + Sync>),
    #[error("send timed out")]
    TimedOut,
}

pub async fn live_socket(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    // Подписываемся до первого чтения, чтобы не потерять события между snapshot и рассылкой
    let events = state.seats.broadcaster().subscribe();
    let (sink, stream) = socket.split();
    run_observer(&state, events, sink, stream).await;
}

/// Drives one observer until it closes, errors or stops taking frames in time.
///
/// `events` must be subscribed before the first snapshot is served. Ping/Pong
/// is answered by the WebSocket layer itself.
pub async fn run_observer<S, R, E>(
    state: &AppState,
    mut events: broadcast::Receiver<Arc<Broadcast>>,
    mut sink: S,
    mut stream: R,
) where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let connection_id = Uuid::new_v4();
    let send_timeout = state.config.send_timeout();
    // Версии мест, которые клиент уже видел в snapshot или в событиях
    let mut seen: HashMap<i32, i64> = HashMap::new();
    info!(%connection_id, observers = state.seats.broadcaster().observer_count(), "Observer connected");

    loop {
        tokio::select! {
            biased;

            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let reply = handle_client_frame(state, text.as_str(), &mut seen).await;
                    if let Err(e) = send_event(&mut sink, &reply, send_timeout).await {
                        warn!(%connection_id, error = %e, "Failed to reply to observer");
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    warn!(%connection_id, error = %e, "WebSocket error");
                    break;
                }
                _ => {} // Binary, Ping, Pong
            },
            item = events.recv() => match item {
                Ok(item) => {
                    if item.is_covered_by(&seen) {
                        debug!(%connection_id, "Skipping change already in the snapshot");
                        continue;
                    }
                    item.record(&mut seen);
                    if let Err(e) = send_event(&mut sink, &item.event, send_timeout).await {
                        warn!(%connection_id, error = %e, "Dropping observer");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(%connection_id, skipped, "Observer lagged, asking it to resync");
                    let resync = LiveEvent::Resync { skipped };
                    if let Err(e) = send_event(&mut sink, &resync, send_timeout).await {
                        warn!(%connection_id, error = %e, "Dropping observer");
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    info!(%connection_id, "Observer disconnected");
}

async fn handle_client_frame(state: &AppState, text: &str, seen: &mut HashMap<i32, i64>) -> LiveEvent {
    match serde_json::from_str::<ClientEvent>(text) {
        Ok(ClientEvent::GetSeats(day_id)) => match state.seats.list_seats(day_id).await {
            Ok(seats) => {
                debug!(day_id, seats = seats.len(), "Serving seat snapshot");
                for seat in &seats {
                    let held = seen.entry(seat.id).or_insert(seat.version);
                    *held = (*held).max(seat.version);
                }
                LiveEvent::SeatsData { day_id, seats }
            }
            Err(e) => {
                error!(day_id, error = %e, "Failed to load seats for observer");
                LiveEvent::Error { message: "Failed to load seats".to_string() }
            }
        },
        Err(e) => LiveEvent::Error { message: format!("Unrecognised message: {e}") },
    }
}

async fn send_event<S>(sink: &mut S, event: &LiveEvent, timeout: Duration) -> Result<(), SendError>
where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let json = serde_json::to_string(event)?;
    tokio::time::timeout(timeout, sink.send(Message::Text(json.into())))
        .await
        .map_err(|_| SendError::TimedOut)?
        .map_err(|e| SendError::Socket(Box::new(e)))?;
    Ok(())
}
