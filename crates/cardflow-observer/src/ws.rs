//! `WebSocket` handler for live snapshot streaming.
//!
//! Clients connect to `GET /ws/sessions/{id}` and receive a
//! JSON-encoded snapshot each time their session's worker records a
//! transition. Connecting claims the session (creating it on first
//! contact); a closed socket stops the session's run, since an
//! unobserved playthrough has no audience.
//!
//! If a client falls behind, lagged frames are silently skipped and
//! the client resumes from the most recent snapshot.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use cardflow_core::session::SessionController;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming the session's snapshots.
///
/// # Route
///
/// `GET /ws/sessions/{id}`
pub async fn ws_session(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = Uuid::parse_str(&raw)
        .map(cardflow_types::SessionId::from)
        .map_err(|_| ApiError::InvalidUuid(raw))?;
    let controller = state.registry.get_or_create(id).await;
    Ok(ws.on_upgrade(move |socket| handle_ws(socket, state, controller)))
}

/// Handle the `WebSocket` lifecycle: subscribe to the session's
/// broadcast channel and forward each snapshot as a text frame. When
/// the client goes away, the session's run is stopped but its state is
/// kept for reconnection.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>, controller: Arc<SessionController>) {
    let session = controller.id();
    debug!(%session, "WebSocket viewer connected");

    let mut rx = state.hub.subscribe(session).await;

    loop {
        tokio::select! {
            // Receive a snapshot frame from the worker.
            result = rx.recv() => {
                match result {
                    Ok(frame) => {
                        let json = match serde_json::to_string(&*frame.snapshot) {
                            Ok(j) => j,
                            Err(e) => {
                                warn!(%session, "failed to serialize snapshot: {e}");
                                continue;
                            }
                        };
                        let msg: Message = Message::Text(json.into());
                        if socket.send(msg).await.is_err() {
                            debug!(%session, "viewer disconnected (send failed)");
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        debug!(%session, skipped = n, "viewer lagged, skipping ahead");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        debug!(%session, "snapshot channel closed, shutting down socket");
                        break;
                    }
                }
            }
            // Check if the client sent a close frame or disconnected.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%session, "viewer disconnected");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let pong = Message::Pong(data);
                        if socket.send(pong).await.is_err() {
                            debug!(%session, "viewer disconnected (pong failed)");
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(%session, "WebSocket error: {e}");
                        break;
                    }
                    _ => {
                        // Ignore other message types (text, binary from client).
                    }
                }
            }
        }
    }

    // A run with no viewer keeps burning transitions for nobody. Stop
    // it, but keep the session so a reconnect resumes where it left
    // off; full removal goes through DELETE /api/sessions/{id}.
    controller.stop();
}
