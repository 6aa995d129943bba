//! Render sink that feeds recorded snapshots into the broadcast hub.

use std::sync::Arc;

use async_trait::async_trait;
use cardflow_core::sink::RenderSink;
use cardflow_types::{GameSnapshot, SessionId};

use crate::state::SnapshotHub;

/// Publishes every recorded snapshot to the session's `WebSocket`
/// viewers.
///
/// Publishing never blocks on viewers: a broadcast send is
/// fire-and-forget, so a slow or absent client cannot stall the
/// worker.
pub struct WsRenderSink {
    hub: Arc<SnapshotHub>,
}

impl WsRenderSink {
    /// Create a sink over the given hub.
    pub const fn new(hub: Arc<SnapshotHub>) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl RenderSink for WsRenderSink {
    async fn on_transition(&self, session: SessionId, snapshot: Arc<GameSnapshot>) {
        self.hub.publish(session, snapshot).await;
    }
}
