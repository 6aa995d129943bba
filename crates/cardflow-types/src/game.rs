//! Seats, decision points, action records, and game-state snapshots.
//!
//! The scheduler treats the game engine as opaque; these types are the
//! contract surface it does understand. A [`GameSnapshot`] is a deep,
//! immutable capture of engine state taken after one transition. The
//! engine mutates a single live state in place, so every snapshot must
//! own its data outright -- nothing in a snapshot may alias engine
//! internals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A seat at the table, numbered from zero.
///
/// Participant counts are small (the supported range tops out at five),
/// so a `u8` index is sufficient.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct PlayerSeat(pub u8);

impl PlayerSeat {
    /// Return the zero-based seat index.
    pub const fn index(self) -> u8 {
        self.0
    }
}

impl core::fmt::Display for PlayerSeat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "seat {}", self.0)
    }
}

/// Whose decision the engine is waiting on.
///
/// A *chance* decision is an exogenous event not attributable to any
/// participant (e.g. revealing the next card from the deck); the engine
/// resolves it itself without external move selection. A *participant*
/// decision requires a move chosen from the legal set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionPoint {
    /// The engine must resolve an exogenous event next.
    Chance,
    /// The given seat must choose a move next.
    Participant {
        /// The seat whose turn it is.
        seat: PlayerSeat,
    },
}

/// Record of the transition that produced a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionRecord {
    /// A chance event was resolved by the engine.
    Chance {
        /// Human-readable description (e.g. "dealt 7♠ to seat 2").
        description: String,
    },
    /// A participant applied a move.
    Move {
        /// The seat that acted.
        seat: PlayerSeat,
        /// Human-readable description of the move.
        description: String,
    },
}

impl ActionRecord {
    /// The acting seat, if the transition was attributable to one.
    pub const fn seat(&self) -> Option<PlayerSeat> {
        match self {
            Self::Chance { .. } => None,
            Self::Move { seat, .. } => Some(*seat),
        }
    }
}

/// An immutable, deep-copied capture of engine state at one point in time.
///
/// Snapshots are recorded most-recent-first in the session's history and
/// delivered in strict transition order to the render sink. The `board`
/// payload is engine-defined JSON; the scheduler never inspects it, only
/// the fields it needs for ordering and termination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// One-based index of the transition that produced this snapshot.
    pub transition: u64,
    /// The decision the engine is waiting on next (meaningless when
    /// `terminal` is true).
    pub to_act: DecisionPoint,
    /// Whether the game has reached a terminal state.
    pub terminal: bool,
    /// The transition that produced this snapshot.
    pub action: ActionRecord,
    /// Engine-defined board view for the presentation layer.
    pub board: serde_json::Value,
    /// Wall-clock time the snapshot was captured.
    pub captured_at: DateTime<Utc>,
}
