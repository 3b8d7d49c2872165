//! Live-update WebSocket endpoint
//!
//! # Endpoint
//!
//! ```text
//! WS /ws
//! ```
//!
//! No handshake payload is required. The channel is server-to-client
//! only: the server pushes change tags after successful mutations and
//! ignores inbound text/binary frames, keeping the connection open
//! purely to detect liveness until the peer goes away.

use crate::app::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};

/// Upgrades the request and hands the socket to the connection loop.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Per-connection loop: registers with the connection manager, forwards
/// broadcast messages to the peer, and deregisters on any exit path.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (id, mut rx) = state.channel.connect();
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            // ── Broadcast forwarding ────────────────────────────────
            maybe = rx.recv() => {
                match maybe {
                    Some(message) => {
                        if sender.send(Message::Text(message)).await.is_err() {
                            break;
                        }
                    }
                    // Registry dropped our sender (pruned as dead)
                    None => break,
                }
            }

            // ── Peer frames (close detection only) ──────────────────
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {
                        // Server-to-client channel; inbound frames ignored
                    }
                    Some(Err(_)) => break,
                }
            }
        }
    }

    state.channel.disconnect(id);
    let _ = sender.send(Message::Close(None)).await;
}
