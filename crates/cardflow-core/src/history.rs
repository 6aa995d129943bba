//! Ordered, most-recent-first log of snapshots for one session.
//!
//! The worker is the only writer; the render/log path reads
//! concurrently. Entries are `Arc`-shared deep snapshots, so nothing is
//! ever mutated post-insertion and a reader racing an append observes
//! either the pre- or post-append sequence, never a torn entry.

use std::collections::VecDeque;
use std::sync::Arc;

use cardflow_types::GameSnapshot;
use tokio::sync::RwLock;

/// Snapshot log for one session, newest entry at index 0.
///
/// Length equals the number of transitions applied in the current run;
/// [`clear`](Self::clear) is the only way to shrink it and is called
/// only when a new run starts.
#[derive(Debug, Default)]
pub struct StateHistory {
    entries: RwLock<VecDeque<Arc<GameSnapshot>>>,
}

impl StateHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a snapshot at the front (most recent first). O(1).
    pub async fn record(&self, snapshot: Arc<GameSnapshot>) {
        self.entries.write().await.push_front(snapshot);
    }

    /// Empty the log. Only legal while no worker is running.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of recorded snapshots.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the log is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Read the snapshot at `index` (0 = most recent).
    pub async fn get(&self, index: usize) -> Option<Arc<GameSnapshot>> {
        self.entries.read().await.get(index).map(Arc::clone)
    }

    /// The most recent snapshot, if any.
    pub async fn latest(&self) -> Option<Arc<GameSnapshot>> {
        self.entries.read().await.front().map(Arc::clone)
    }

    /// Read a page of snapshots starting at `offset` (0 = most recent).
    pub async fn page(&self, offset: usize, limit: usize) -> Vec<Arc<GameSnapshot>> {
        self.entries
            .read()
            .await
            .iter()
            .skip(offset)
            .take(limit)
            .map(Arc::clone)
            .collect()
    }
}
