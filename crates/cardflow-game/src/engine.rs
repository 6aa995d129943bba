//! The opaque game engine contract consumed by the scheduler.
//!
//! The worker loop only ever sees this trait. It asks whose decision is
//! next, resolves chance events or applies selected moves, and captures
//! deep-copy snapshots after every transition. Engines mutate a single
//! live state in place; [`GameEngine::snapshot`] must therefore return
//! fully owned data so recorded history cannot be altered retroactively.

use cardflow_types::{DecisionPoint, GameSnapshot, PlayerSeat};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Per-run engine construction parameters.
///
/// Derived from the session configuration at `start()` time; a fresh
/// engine is built for every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSetup {
    /// Number of participants at the table.
    pub participants: u8,
    /// Whether the starting seat is chosen at random.
    pub randomized_start: bool,
    /// Optional RNG seed for deterministic runs (tests, replays).
    pub seed: Option<u64>,
}

impl Default for GameSetup {
    fn default() -> Self {
        Self {
            participants: 5,
            randomized_start: true,
            seed: None,
        }
    }
}

/// A move as presented to the scheduler and the move selector.
///
/// The `payload` is engine-defined: the engine emits it from
/// [`GameEngine::legal_moves`] and parses it back in
/// [`GameEngine::apply_move`]. The scheduler never inspects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMove {
    /// Human-readable label (e.g. "play 7♠").
    pub label: String,
    /// Engine-defined encoding of the move.
    pub payload: serde_json::Value,
}

/// A turn-based game engine driven one decision at a time.
///
/// Implementations are owned exclusively by one worker for the duration
/// of one run, so `&mut self` mutation is safe; `Send` is required
/// because the worker runs on a spawned task.
pub trait GameEngine: Send {
    /// Whose decision the engine is waiting on.
    fn decision_point(&self) -> DecisionPoint;

    /// Enumerate the legal moves for the given seat.
    ///
    /// Only meaningful when [`decision_point`](Self::decision_point)
    /// names that seat.
    fn legal_moves(&self, seat: PlayerSeat) -> Vec<EngineMove>;

    /// Apply a previously enumerated move, mutating the engine in place.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::IllegalMove`] if the move is not legal in
    /// the current state.
    fn apply_move(&mut self, mv: &EngineMove) -> Result<(), EngineError>;

    /// Resolve the pending chance event (e.g. deal the next card).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoChancePending`] if no chance event is
    /// waiting.
    fn resolve_chance(&mut self) -> Result<(), EngineError>;

    /// Whether the game has reached a terminal state.
    fn is_terminal(&self) -> bool;

    /// Capture a deep-copied, immutable snapshot of the current state.
    fn snapshot(&self) -> GameSnapshot;
}

/// Builds a fresh engine instance for each run of a session.
pub trait EngineFactory: Send + Sync {
    /// Construct an engine from the given setup.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnsupportedParticipants`] if the
    /// participant count is outside the engine's supported range, or
    /// another [`EngineError`] if construction fails.
    fn create(&self, setup: &GameSetup) -> Result<Box<dyn GameEngine>, EngineError>;
}
