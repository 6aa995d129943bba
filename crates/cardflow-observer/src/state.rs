//! Shared server state and the snapshot broadcast hub.
//!
//! [`SnapshotHub`] holds one tokio broadcast channel per session so
//! `WebSocket` viewers of the same session all see the same stream
//! while other sessions stay isolated.

use std::collections::HashMap;
use std::sync::Arc;

use cardflow_core::registry::SessionRegistry;
use cardflow_types::{GameSnapshot, SessionId};
use tokio::sync::{RwLock, broadcast};

/// Capacity of each per-session broadcast channel. Slow viewers past
/// this many undelivered frames skip ahead rather than stall the
/// worker.
const BROADCAST_CAPACITY: usize = 256;

/// One snapshot frame as delivered to `WebSocket` viewers.
#[derive(Debug, Clone)]
pub struct SnapshotFrame {
    /// The session the snapshot belongs to.
    pub session: SessionId,
    /// The recorded snapshot.
    pub snapshot: Arc<GameSnapshot>,
}

/// Per-session broadcast channels for live snapshot streaming.
#[derive(Default)]
pub struct SnapshotHub {
    channels: RwLock<HashMap<SessionId, broadcast::Sender<SnapshotFrame>>>,
}

impl SnapshotHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a session's snapshot stream, creating the channel
    /// on first subscription.
    pub async fn subscribe(&self, session: SessionId) -> broadcast::Receiver<SnapshotFrame> {
        let mut channels = self.channels.write().await;
        channels
            .entry(session)
            .or_insert_with(|| broadcast::channel(BROADCAST_CAPACITY).0)
            .subscribe()
    }

    /// Publish a snapshot to a session's viewers.
    ///
    /// A session with no channel (nobody ever subscribed) or no live
    /// receivers drops the frame; the history remains the durable
    /// record.
    pub async fn publish(&self, session: SessionId, snapshot: Arc<GameSnapshot>) {
        let channels = self.channels.read().await;
        if let Some(tx) = channels.get(&session) {
            let _ = tx.send(SnapshotFrame { session, snapshot });
        }
    }

    /// Drop a session's channel, disconnecting its viewers.
    pub async fn remove(&self, session: SessionId) {
        self.channels.write().await.remove(&session);
    }
}

/// Shared state for all Observer handlers.
pub struct AppState {
    /// All live sessions.
    pub registry: Arc<SessionRegistry>,
    /// Broadcast hub feeding `WebSocket` viewers.
    pub hub: Arc<SnapshotHub>,
}

impl AppState {
    /// Create server state over a registry and hub.
    pub const fn new(registry: Arc<SessionRegistry>, hub: Arc<SnapshotHub>) -> Self {
        Self { registry, hub }
    }
}
