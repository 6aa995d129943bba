//! Error types for the game engine seam.

use cardflow_types::PlayerSeat;

/// Errors that can occur while constructing or driving a game engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The requested participant count is outside the engine's range.
    #[error("unsupported participant count {requested} (supported: {min}..={max})")]
    UnsupportedParticipants {
        /// The count the session asked for.
        requested: u8,
        /// Minimum the engine supports.
        min: u8,
        /// Maximum the engine supports.
        max: u8,
    },

    /// A move was applied that the current state does not permit.
    #[error("illegal move: {label}")]
    IllegalMove {
        /// Label of the rejected move.
        label: String,
    },

    /// `resolve_chance` was called with no chance event pending.
    #[error("no chance event pending")]
    NoChancePending,

    /// A participant was asked to act but has no legal moves.
    ///
    /// A well-formed engine never reaches this state; it indicates an
    /// engine bug and forces the run to stop.
    #[error("{seat} has no legal moves")]
    NoLegalMoves {
        /// The seat with an empty legal-move set.
        seat: PlayerSeat,
    },

    /// An internal engine failure.
    #[error("engine error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}
