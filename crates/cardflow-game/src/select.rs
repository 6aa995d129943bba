//! Move selection policy.
//!
//! During a participant decision the worker enumerates the legal moves
//! and hands them to a [`MoveSelector`]. The mechanism is opaque to the
//! scheduler -- it could be a learned policy, a scripted bot, or the
//! uniform-random default shipped here.

use cardflow_types::{GameSnapshot, PlayerSeat};
use rand::seq::IndexedRandom;

use crate::engine::EngineMove;

/// Chooses one move from a participant's legal set.
///
/// Implementations must be `Send + Sync`: one selector instance is
/// shared by all session workers.
pub trait MoveSelector: Send + Sync {
    /// Select a move for `seat` given the legal set and the current state.
    ///
    /// Returns `None` only when `legal` is empty; the worker treats that
    /// as an engine fault.
    fn select(
        &self,
        legal: &[EngineMove],
        seat: PlayerSeat,
        state: &GameSnapshot,
    ) -> Option<EngineMove>;
}

/// Uniform-random move selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSelector;

impl RandomSelector {
    /// Create a new random selector.
    pub const fn new() -> Self {
        Self
    }
}

impl MoveSelector for RandomSelector {
    fn select(
        &self,
        legal: &[EngineMove],
        _seat: PlayerSeat,
        _state: &GameSnapshot,
    ) -> Option<EngineMove> {
        legal.choose(&mut rand::rng()).cloned()
    }
}
