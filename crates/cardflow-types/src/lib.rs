//! Shared type definitions for the Cardflow playthrough viewer.
//!
//! This crate holds the types that cross crate boundaries: session
//! identifiers, seat/decision markers, view modes, and the immutable
//! [`GameSnapshot`] that the scheduler records and the viewer renders.
//!
//! # Modules
//!
//! - [`ids`] -- Strongly-typed UUID wrappers ([`SessionId`]).
//! - [`game`] -- Seats, decision points, action records, snapshots.
//! - [`view`] -- The [`ViewMode`] enumeration (rendering-only concern).
//!
//! [`SessionId`]: ids::SessionId
//! [`GameSnapshot`]: game::GameSnapshot
//! [`ViewMode`]: view::ViewMode

pub mod game;
pub mod ids;
pub mod view;

pub use game::{ActionRecord, DecisionPoint, GameSnapshot, PlayerSeat};
pub use ids::SessionId;
pub use view::ViewMode;
