//! Game engine contract, move selection, and the built-in demo engine.
//!
//! The scheduler in `cardflow-core` drives a turn-based engine one
//! decision at a time without knowing anything about the game being
//! played. This crate defines that seam:
//!
//! - [`engine`] -- The [`GameEngine`] trait (decision points, legal
//!   moves, move application, chance resolution, termination, deep-copy
//!   snapshots) and the [`EngineFactory`] that builds a fresh engine per
//!   run.
//! - [`select`] -- The [`MoveSelector`] trait and [`RandomSelector`],
//!   the default uniform-random policy.
//! - [`demo`] -- A compact dealt-hand card game implementing the
//!   contract end-to-end, used by the bench binary and tests. It stands
//!   in for an external engine the way a stub backend would; swapping in
//!   a real engine means implementing [`GameEngine`] and nothing else.
//!
//! [`GameEngine`]: engine::GameEngine
//! [`EngineFactory`]: engine::EngineFactory
//! [`MoveSelector`]: select::MoveSelector
//! [`RandomSelector`]: select::RandomSelector

pub mod demo;
pub mod engine;
pub mod error;
pub mod select;

pub use demo::DemoEngineFactory;
pub use engine::{EngineFactory, EngineMove, GameEngine, GameSetup};
pub use error::EngineError;
pub use select::{MoveSelector, RandomSelector};
