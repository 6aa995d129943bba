//! The seam between the worker and the presentation layer.
//!
//! After every transition the worker hands the freshly captured
//! snapshot to the session's [`RenderSink`]. The sink is owned by the
//! UI layer; the scheduler knows nothing about how (or whether) the
//! snapshot is displayed. The call is async and the worker awaits it,
//! so sink latency directly throttles simulation throughput -- a sink
//! that must not slow the worker should hand off to a queue and return.

use std::sync::Arc;

use async_trait::async_trait;
use cardflow_types::{GameSnapshot, SessionId};

/// Consumer of `(session, snapshot)` pairs, one per transition.
///
/// Snapshots for one session are delivered in strict transition order,
/// never reordered or dropped by the worker. One sink instance is
/// shared by all sessions.
#[async_trait]
pub trait RenderSink: Send + Sync {
    /// Called once per transition with the freshly captured snapshot,
    /// plus once more with the final state when a run ends.
    async fn on_transition(&self, session: SessionId, snapshot: Arc<GameSnapshot>);
}

/// A sink that discards everything. Used in tests and headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderSink;

impl NullRenderSink {
    /// Create a new null sink.
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RenderSink for NullRenderSink {
    async fn on_transition(&self, _session: SessionId, _snapshot: Arc<GameSnapshot>) {}
}
