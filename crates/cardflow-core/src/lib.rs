//! Session-scoped simulation scheduler for Cardflow.
//!
//! This crate is the concurrency core of the repository: it starts,
//! pauses, resumes, throttles, and stops one background playthrough per
//! client session, coordinates it with the presentation layer, and
//! maintains an ordered history of snapshots for inspection.
//!
//! # Modules
//!
//! - [`gate`] -- [`PauseGate`], the cooperative suspension primitive
//!   giving pause/resume/step-rate/cancel control over a running worker.
//! - [`history`] -- [`StateHistory`], the ordered most-recent-first log
//!   of immutable snapshots for one session.
//! - [`sink`] -- [`RenderSink`], the seam through which the worker hands
//!   snapshots to the presentation layer.
//! - [`worker`] -- The loop driving one run of the engine to completion
//!   or cancellation.
//! - [`session`] -- [`SessionController`], owning one worker + history +
//!   gate per client session.
//! - [`registry`] -- [`SessionRegistry`], the process-wide session map
//!   with idempotent creation and disconnect cleanup.
//! - [`config`] -- Typed YAML configuration loading.
//!
//! [`PauseGate`]: gate::PauseGate
//! [`StateHistory`]: history::StateHistory
//! [`RenderSink`]: sink::RenderSink
//! [`SessionController`]: session::SessionController
//! [`SessionRegistry`]: registry::SessionRegistry

pub mod config;
pub mod gate;
pub mod history;
pub mod registry;
pub mod session;
pub mod sink;
pub mod worker;

#[cfg(test)]
pub(crate) mod testutil;
