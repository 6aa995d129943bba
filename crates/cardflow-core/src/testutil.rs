//! Deterministic engines, selectors, and sinks for scheduler tests.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use cardflow_game::engine::{EngineFactory, EngineMove, GameEngine, GameSetup};
use cardflow_game::error::EngineError;
use cardflow_game::select::MoveSelector;
use cardflow_types::{ActionRecord, DecisionPoint, GameSnapshot, PlayerSeat, SessionId};
use chrono::Utc;
use tokio::sync::{Mutex, Semaphore};

use crate::sink::RenderSink;

/// An engine that alternates chance and participant decisions and
/// terminates after a fixed number of transitions.
pub(crate) struct ScriptedEngine {
    done: u64,
    total: u64,
    /// Transition index at which engine calls start failing (0 = never).
    fail_at: u64,
}

impl ScriptedEngine {
    pub(crate) const fn new(total: u64) -> Self {
        Self {
            done: 0,
            total,
            fail_at: 0,
        }
    }

    pub(crate) const fn failing_at(total: u64, fail_at: u64) -> Self {
        Self {
            done: 0,
            total,
            fail_at,
        }
    }

    fn advance(&mut self) -> Result<(), EngineError> {
        if self.fail_at > 0 && self.done.saturating_add(1) >= self.fail_at {
            return Err(EngineError::Internal {
                message: String::from("scripted failure"),
            });
        }
        self.done = self.done.saturating_add(1);
        Ok(())
    }
}

impl GameEngine for ScriptedEngine {
    fn decision_point(&self) -> DecisionPoint {
        if self.done.checked_rem(2) == Some(0) {
            DecisionPoint::Chance
        } else {
            DecisionPoint::Participant {
                seat: PlayerSeat(0),
            }
        }
    }

    fn legal_moves(&self, _seat: PlayerSeat) -> Vec<EngineMove> {
        vec![EngineMove {
            label: String::from("advance"),
            payload: serde_json::json!({}),
        }]
    }

    fn apply_move(&mut self, _mv: &EngineMove) -> Result<(), EngineError> {
        self.advance()
    }

    fn resolve_chance(&mut self) -> Result<(), EngineError> {
        self.advance()
    }

    fn is_terminal(&self) -> bool {
        self.done >= self.total
    }

    fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            transition: self.done,
            to_act: self.decision_point(),
            terminal: self.is_terminal(),
            action: ActionRecord::Chance {
                description: format!("scripted transition {}", self.done),
            },
            board: serde_json::json!({ "step": self.done }),
            captured_at: Utc::now(),
        }
    }
}

/// Factory for [`ScriptedEngine`] instances.
pub(crate) struct ScriptedFactory {
    pub(crate) total: u64,
    pub(crate) fail_at: u64,
}

impl ScriptedFactory {
    pub(crate) const fn new(total: u64) -> Self {
        Self { total, fail_at: 0 }
    }
}

impl EngineFactory for ScriptedFactory {
    fn create(&self, _setup: &GameSetup) -> Result<Box<dyn GameEngine>, EngineError> {
        Ok(Box::new(ScriptedEngine {
            done: 0,
            total: self.total,
            fail_at: self.fail_at,
        }))
    }
}

/// A factory that always refuses to build an engine.
pub(crate) struct RefusingFactory;

impl EngineFactory for RefusingFactory {
    fn create(&self, setup: &GameSetup) -> Result<Box<dyn GameEngine>, EngineError> {
        Err(EngineError::UnsupportedParticipants {
            requested: setup.participants,
            min: 2,
            max: 5,
        })
    }
}

/// Deterministic selector: always the first legal move.
pub(crate) struct FirstMoveSelector;

impl MoveSelector for FirstMoveSelector {
    fn select(
        &self,
        legal: &[EngineMove],
        _seat: PlayerSeat,
        _state: &GameSnapshot,
    ) -> Option<EngineMove> {
        legal.first().cloned()
    }
}

/// A sink that records every delivery in order.
#[derive(Default)]
pub(crate) struct CountingSink {
    deliveries: Mutex<Vec<(SessionId, u64)>>,
}

impl CountingSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn deliveries(&self) -> Vec<(SessionId, u64)> {
        self.deliveries.lock().await.clone()
    }
}

#[async_trait]
impl RenderSink for CountingSink {
    async fn on_transition(&self, session: SessionId, snapshot: Arc<GameSnapshot>) {
        self.deliveries
            .lock()
            .await
            .push((session, snapshot.transition));
    }
}

/// A sink that parks every delivery until [`release`](Self::release),
/// wedging the worker mid-transition.
pub(crate) struct StalledSink {
    permits: Semaphore,
    delivered: AtomicU64,
}

impl StalledSink {
    pub(crate) const fn new() -> Self {
        Self {
            permits: Semaphore::const_new(0),
            delivered: AtomicU64::new(0),
        }
    }

    /// Unblock all pending and future deliveries.
    pub(crate) fn release(&self) {
        self.permits.add_permits(Semaphore::MAX_PERMITS);
    }

    pub(crate) fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Acquire)
    }
}

#[async_trait]
impl RenderSink for StalledSink {
    async fn on_transition(&self, _session: SessionId, _snapshot: Arc<GameSnapshot>) {
        if self.permits.acquire().await.is_ok() {
            self.delivered.fetch_add(1, Ordering::AcqRel);
        }
    }
}
