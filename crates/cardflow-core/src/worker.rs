//! The loop driving one run of the engine to completion or cancellation.
//!
//! Each iteration: hold at the gate while paused, check for cooperative
//! cancellation and terminal state, resolve one decision (chance or
//! participant), capture a deep snapshot, record it, hand it to the
//! render sink, then wait out the step interval. Any engine or selector
//! failure is caught here at the worker boundary -- it stops this run
//! and never propagates into the hosting process, so other sessions'
//! workers are unaffected.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cardflow_game::engine::GameEngine;
use cardflow_game::error::EngineError;
use cardflow_game::select::MoveSelector;
use cardflow_types::{DecisionPoint, GameSnapshot, SessionId};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::gate::PauseGate;
use crate::history::StateHistory;
use crate::sink::RenderSink;

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The engine reached a terminal state.
    Terminal,
    /// A stop (or disconnect) command cancelled the run.
    Stopped,
    /// An engine or selector failure forced the run to stop.
    Fault,
}

/// Result of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    /// Why the run ended.
    pub end_reason: EndReason,
    /// Number of transitions applied.
    pub transitions: u64,
}

/// Everything one worker owns or shares for the duration of one run.
pub(crate) struct WorkerContext {
    /// The session this worker belongs to.
    pub(crate) session: SessionId,
    /// The engine instance, owned exclusively for this run.
    pub(crate) engine: Box<dyn GameEngine>,
    /// Move selection policy for participant decisions.
    pub(crate) selector: Arc<dyn MoveSelector>,
    /// Control gate shared with the command path.
    pub(crate) gate: Arc<PauseGate>,
    /// Snapshot log shared with the render/log path.
    pub(crate) history: Arc<StateHistory>,
    /// Presentation-layer consumer of snapshots.
    pub(crate) sink: Arc<dyn RenderSink>,
    /// Session running flag, cleared when this worker retires.
    pub(crate) running: Arc<AtomicBool>,
}

/// Resolve exactly one decision, mutating the engine.
fn step_once(engine: &mut dyn GameEngine, selector: &dyn MoveSelector) -> Result<(), EngineError> {
    match engine.decision_point() {
        DecisionPoint::Chance => engine.resolve_chance(),
        DecisionPoint::Participant { seat } => {
            let legal = engine.legal_moves(seat);
            let state = engine.snapshot();
            let chosen = selector
                .select(&legal, seat, &state)
                .ok_or(EngineError::NoLegalMoves { seat })?;
            engine.apply_move(&chosen)
        }
    }
}

/// Drive one run of the engine until terminal state or cancellation.
///
/// Returns the outcome; the caller (the session controller's spawned
/// task) records it. The worker clears the session's running flag and
/// performs one final render invocation with the last known state
/// before retiring.
pub(crate) async fn run_worker(mut ctx: WorkerContext) -> RunOutcome {
    let mut transitions: u64 = 0;
    let mut last: Option<Arc<GameSnapshot>> = None;

    info!(session = %ctx.session, "run starting");

    let end_reason = loop {
        // --- Hold while paused (also a cancellation point) ---
        ctx.gate.wait_if_paused().await;
        if !ctx.gate.is_active() {
            break EndReason::Stopped;
        }
        if ctx.engine.is_terminal() {
            break EndReason::Terminal;
        }

        // --- Resolve one decision ---
        if let Err(e) = step_once(ctx.engine.as_mut(), ctx.selector.as_ref()) {
            error!(session = %ctx.session, error = %e, "transition failed, stopping run");
            ctx.gate.stop();
            break EndReason::Fault;
        }

        // --- Record and render ---
        let snapshot = Arc::new(ctx.engine.snapshot());
        ctx.history.record(Arc::clone(&snapshot)).await;
        ctx.sink.on_transition(ctx.session, Arc::clone(&snapshot)).await;
        last = Some(snapshot);
        transitions = transitions.saturating_add(1);

        // --- Throttle ---
        ctx.gate.wait_step_interval().await;
    };

    ctx.running.store(false, Ordering::Release);

    // One final render with the last known state so the viewer settles
    // on the end position even if it missed the live delivery.
    if let Some(snapshot) = last {
        ctx.sink.on_transition(ctx.session, snapshot).await;
    }

    info!(
        session = %ctx.session,
        end_reason = ?end_reason,
        transitions,
        "run finished"
    );

    RunOutcome {
        end_reason,
        transitions,
    }
}
