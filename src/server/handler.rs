//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{domain::SessionId, protocol::ClientMessage};

use super::{
    router::{self, HandleOutcome},
    state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Per-connection control loop.
///
/// Assigns the session identifier, pumps inbound frames through the router
/// and drains the connection's outbound queue to the socket. Message
/// handling is sequential per connection; the registries are shared via
/// the state mutex.
pub async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = SessionId::generate();
    tracing::info!("connection established: session {}", session_id);

    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Outbound queue for this client; the router pushes, the send task
    // drains. Delivery is best-effort.
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if ws_sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("websocket error on session {}: {}", session_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("received from session {}: {}", session_id, text);

                    // Parse failures are per-message: log, drop, keep the
                    // connection open.
                    let parsed = match ClientMessage::parse(&text) {
                        Ok(Some(message)) => message,
                        Ok(None) => continue,
                        Err(e) => {
                            tracing::warn!("dropping frame from session {}: {}", session_id, e);
                            continue;
                        }
                    };

                    let outcome = {
                        let mut registry = recv_state.registry.lock().await;
                        router::handle_message(&mut registry, session_id, &tx, parsed)
                    };

                    if outcome == HandleOutcome::Close {
                        tracing::warn!("closing session {} after protocol violation", session_id);
                        break;
                    }
                }
                Message::Close(_) => {
                    tracing::info!("session {} requested close", session_id);
                    break;
                }
                Message::Ping(_) => {
                    // Answered automatically by axum.
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Unbind the session so a later message on a reused id cannot be
    // mis-routed. Room slots stay as they are.
    {
        let mut registry = state.registry.lock().await;
        registry.remove_session(session_id);
    }
    tracing::info!("connection closed: session {}", session_id);
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}
