//! Per-session ownership of one worker, one history, and one gate.
//!
//! A [`SessionController`] moves through `Idle -> Running -> {Paused <->
//! Running} -> Idle`. `start` is legal only from Idle and enforces
//! at-most-one-worker-per-session; every other command is a no-op when
//! no worker is active, because commands may legitimately race with a
//! just-finished run.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use cardflow_game::engine::{EngineFactory, GameSetup};
use cardflow_game::error::EngineError;
use cardflow_game::select::MoveSelector;
use cardflow_types::{SessionId, ViewMode};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::gate::PauseGate;
use crate::history::StateHistory;
use crate::sink::RenderSink;
use crate::worker::{self, EndReason, RunOutcome, WorkerContext};

/// How long `on_disconnect` waits for a worker to retire before
/// aborting it. Generous next to the cancellation bound (one in-flight
/// move plus one render), kept finite so teardown can never hang.
const TEARDOWN_GRACE: Duration = Duration::from_secs(5);

/// Per-session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Number of participants at the table (bounded by the engine).
    pub participant_count: u8,
    /// Initial delay between transitions in milliseconds (0 = none).
    pub step_interval_ms: u64,
    /// How the presentation layer renders snapshots. Never affects
    /// scheduling.
    pub view_mode: ViewMode,
    /// Whether each run starts from a random seat.
    pub randomized_start: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            participant_count: 5,
            step_interval_ms: 1000,
            view_mode: ViewMode::Observer,
            randomized_start: true,
        }
    }
}

/// Errors surfaced by session commands.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// `start` was issued while a worker is already active.
    #[error("a worker is already running for this session")]
    AlreadyRunning,

    /// The engine factory refused to build an engine; the session
    /// remains Idle.
    #[error("worker could not be started: {source}")]
    Startup {
        /// The underlying engine error.
        #[from]
        source: EngineError,
    },

    /// A configuration change was rejected while a run is in progress.
    #[error("configuration locked while running: {reason}")]
    ConfigLocked {
        /// Which change was rejected.
        reason: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong.
        reason: String,
    },
}

/// JSON-serializable status of one session for the API layer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    /// The session identity.
    pub session: SessionId,
    /// Whether a worker is currently active.
    pub running: bool,
    /// Whether the gate is paused.
    pub paused: bool,
    /// Current step interval in milliseconds.
    pub step_interval_ms: u64,
    /// Number of snapshots recorded in the current/last run.
    pub transitions: usize,
    /// The session configuration.
    pub config: SessionConfig,
    /// Why the last run ended, if one has.
    pub end_reason: Option<EndReason>,
}

/// Owns one simulation worker, one history, and one gate for a session.
pub struct SessionController {
    id: SessionId,
    config: RwLock<SessionConfig>,
    gate: Arc<PauseGate>,
    history: Arc<StateHistory>,
    running: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
    last_outcome: Arc<Mutex<Option<RunOutcome>>>,
    engine_factory: Arc<dyn EngineFactory>,
    selector: Arc<dyn MoveSelector>,
    sink: Arc<dyn RenderSink>,
}

impl SessionController {
    /// Create an idle controller with the given defaults and
    /// collaborators.
    pub fn new(
        id: SessionId,
        config: SessionConfig,
        engine_factory: Arc<dyn EngineFactory>,
        selector: Arc<dyn MoveSelector>,
        sink: Arc<dyn RenderSink>,
    ) -> Self {
        let gate = Arc::new(PauseGate::new(config.step_interval_ms));
        Self {
            id,
            config: RwLock::new(config),
            gate,
            history: Arc::new(StateHistory::new()),
            running: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
            last_outcome: Arc::new(Mutex::new(None)),
            engine_factory,
            selector,
            sink,
        }
    }

    /// The session identity.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Whether a worker is currently active for this session.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Whether the session is paused (meaningful while running).
    pub fn is_paused(&self) -> bool {
        self.gate.is_paused()
    }

    /// The session's snapshot log.
    pub fn history(&self) -> Arc<StateHistory> {
        Arc::clone(&self.history)
    }

    /// Start a new run. Legal only from Idle.
    ///
    /// Clears the history, arms the gate, builds a fresh engine from the
    /// session configuration, and spawns exactly one worker.
    ///
    /// # Errors
    ///
    /// [`SessionError::AlreadyRunning`] if a worker is active, or
    /// [`SessionError::Startup`] if the engine could not be built (the
    /// session stays Idle).
    pub async fn start(&self) -> Result<(), SessionError> {
        // Claiming the running flag is the at-most-one-worker gate.
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!(session = %self.id, "start ignored, worker already active");
            return Err(SessionError::AlreadyRunning);
        }

        let config = self.config.read().await.clone();
        let setup = GameSetup {
            participants: config.participant_count,
            randomized_start: config.randomized_start,
            seed: None,
        };
        let engine = match self.engine_factory.create(&setup) {
            Ok(engine) => engine,
            Err(e) => {
                self.running.store(false, Ordering::Release);
                error!(session = %self.id, error = %e, "worker could not be started");
                return Err(e.into());
            }
        };

        // No worker is running here, so clearing the history is legal.
        self.history.clear().await;
        self.gate.reset();
        *self.last_outcome.lock().await = None;

        let ctx = WorkerContext {
            session: self.id,
            engine,
            selector: Arc::clone(&self.selector),
            gate: Arc::clone(&self.gate),
            history: Arc::clone(&self.history),
            sink: Arc::clone(&self.sink),
            running: Arc::clone(&self.running),
        };
        let outcome_slot = Arc::clone(&self.last_outcome);
        let handle = tokio::spawn(async move {
            let outcome = worker::run_worker(ctx).await;
            *outcome_slot.lock().await = Some(outcome);
        });

        *self.worker.lock().await = Some(handle);
        info!(
            session = %self.id,
            participants = config.participant_count,
            step_interval_ms = self.gate.step_interval_ms(),
            "run started"
        );
        Ok(())
    }

    /// Request cooperative cancellation of the current run.
    ///
    /// Non-blocking; the worker observes the flag at its next
    /// suspension point and exits. A no-op when no worker is active.
    pub fn stop(&self) {
        debug!(session = %self.id, "stop requested");
        self.gate.stop();
    }

    /// Pause the current run. A no-op when already paused or idle.
    pub fn pause(&self) {
        debug!(session = %self.id, "pause requested");
        self.gate.pause();
    }

    /// Resume a paused run, cutting short any pending interval wait.
    pub fn resume(&self) {
        debug!(session = %self.id, "resume requested");
        self.gate.resume();
    }

    /// Change the step interval; applies to the very next wait.
    ///
    /// The configuration is updated in the same call so `status` never
    /// reports one interval on the gate and another on the config.
    pub async fn set_step_interval(&self, ms: u64) {
        debug!(session = %self.id, step_interval_ms = ms, "step interval changed");
        self.config.write().await.step_interval_ms = ms;
        self.gate.set_step_interval_ms(ms);
    }

    /// Update per-session configuration.
    ///
    /// The participant count shapes the next run's engine and is
    /// rejected while a worker is active; the view mode is a rendering
    /// concern and may change at any time.
    ///
    /// # Errors
    ///
    /// [`SessionError::ConfigLocked`] when changing the participant
    /// count mid-run, [`SessionError::InvalidConfig`] for a zero count.
    pub async fn update_config(
        &self,
        participant_count: Option<u8>,
        view_mode: Option<ViewMode>,
    ) -> Result<(), SessionError> {
        if let Some(count) = participant_count {
            if count == 0 {
                return Err(SessionError::InvalidConfig {
                    reason: String::from("participant_count must be at least 1"),
                });
            }
            if self.is_running() {
                return Err(SessionError::ConfigLocked {
                    reason: String::from("participant_count"),
                });
            }
            self.config.write().await.participant_count = count;
        }
        if let Some(mode) = view_mode {
            self.config.write().await.view_mode = mode;
        }
        Ok(())
    }

    /// Tear the session down on client disconnect.
    ///
    /// Stops the run, then waits up to a bounded grace period for the
    /// worker to retire so a concurrent viewer read is not yanked
    /// mid-flight; a worker still alive after the grace is aborted.
    /// Immediate when no worker was ever started.
    pub async fn on_disconnect(&self) {
        self.teardown(TEARDOWN_GRACE).await;
    }

    async fn teardown(&self, grace: Duration) {
        self.stop();
        let handle = self.worker.lock().await.take();
        if let Some(mut handle) = handle {
            // Borrow the handle across the timeout so it survives an
            // expiry and can still be aborted.
            match tokio::time::timeout(grace, &mut handle).await {
                Ok(Ok(())) => debug!(session = %self.id, "worker retired"),
                Ok(Err(e)) => warn!(session = %self.id, error = %e, "worker task failed"),
                Err(_) => {
                    handle.abort();
                    // The aborted worker can no longer clear its own flag.
                    self.running.store(false, Ordering::Release);
                    warn!(session = %self.id, "worker did not retire within grace, aborted");
                }
            }
        }
        info!(session = %self.id, "session disconnected");
    }

    /// Why the last run ended, if one has.
    pub async fn end_reason(&self) -> Option<EndReason> {
        self.last_outcome.lock().await.map(|o| o.end_reason)
    }

    /// Assemble the current status for the API layer.
    pub async fn status(&self) -> SessionStatus {
        SessionStatus {
            session: self.id,
            running: self.is_running(),
            paused: self.is_paused(),
            step_interval_ms: self.gate.step_interval_ms(),
            transitions: self.history.len().await,
            config: self.config.read().await.clone(),
            end_reason: self.end_reason().await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use cardflow_game::demo::DemoEngineFactory;
    use cardflow_game::select::RandomSelector;

    use super::*;
    use crate::sink::{NullRenderSink, RenderSink};
    use crate::testutil::{FirstMoveSelector, RefusingFactory, ScriptedFactory, StalledSink};

    fn zero_interval_config() -> SessionConfig {
        SessionConfig {
            step_interval_ms: 0,
            ..SessionConfig::default()
        }
    }

    fn scripted_controller(total: u64, config: SessionConfig) -> SessionController {
        SessionController::new(
            SessionId::new(),
            config,
            Arc::new(ScriptedFactory::new(total)),
            Arc::new(FirstMoveSelector),
            Arc::new(NullRenderSink::new()),
        )
    }

    async fn wait_until_idle(controller: &SessionController) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while controller.is_running() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn completed_run_leaves_full_history_and_terminal_reason() {
        let controller = scripted_controller(12, zero_interval_config());
        controller.start().await.unwrap();
        wait_until_idle(&controller).await;

        let status = controller.status().await;
        assert!(!status.running);
        assert_eq!(status.transitions, 12);
        assert_eq!(status.end_reason, Some(EndReason::Terminal));
    }

    #[tokio::test]
    async fn second_start_while_running_is_rejected() {
        let mut config = zero_interval_config();
        config.step_interval_ms = 50;
        let controller = scripted_controller(1_000_000, config);
        controller.start().await.unwrap();

        assert!(matches!(
            controller.start().await,
            Err(SessionError::AlreadyRunning)
        ));

        controller.stop();
        wait_until_idle(&controller).await;
        assert_eq!(
            controller.end_reason().await,
            Some(EndReason::Stopped)
        );
    }

    #[tokio::test]
    async fn startup_failure_leaves_the_session_idle() {
        let controller = SessionController::new(
            SessionId::new(),
            zero_interval_config(),
            Arc::new(RefusingFactory),
            Arc::new(FirstMoveSelector),
            Arc::new(NullRenderSink::new()),
        );
        assert!(matches!(
            controller.start().await,
            Err(SessionError::Startup { .. })
        ));
        assert!(!controller.is_running());
        assert_eq!(controller.history().len().await, 0);
    }

    #[tokio::test]
    async fn commands_without_a_worker_are_no_ops() {
        let controller = scripted_controller(4, zero_interval_config());
        // None of these may panic or wedge the session.
        controller.stop();
        controller.pause();
        controller.resume();
        controller.set_step_interval(10).await;

        controller.start().await.unwrap();
        wait_until_idle(&controller).await;
        assert_eq!(controller.status().await.transitions, 4);
    }

    #[tokio::test]
    async fn new_run_clears_previous_history() {
        let controller = scripted_controller(6, zero_interval_config());
        controller.start().await.unwrap();
        wait_until_idle(&controller).await;
        assert_eq!(controller.history().len().await, 6);

        controller.start().await.unwrap();
        wait_until_idle(&controller).await;
        // Cleared and refilled, not appended.
        assert_eq!(controller.history().len().await, 6);
    }

    #[tokio::test]
    async fn participant_count_is_locked_while_running() {
        let mut config = zero_interval_config();
        config.step_interval_ms = 50;
        let controller = scripted_controller(1_000_000, config);
        controller.start().await.unwrap();

        assert!(matches!(
            controller.update_config(Some(3), None).await,
            Err(SessionError::ConfigLocked { .. })
        ));
        // View mode stays changeable mid-run.
        controller
            .update_config(None, Some(ViewMode::Agent))
            .await
            .unwrap();

        controller.stop();
        wait_until_idle(&controller).await;
        controller.update_config(Some(3), None).await.unwrap();
        assert_eq!(controller.status().await.config.participant_count, 3);
    }

    #[tokio::test]
    async fn disconnect_tears_down_a_running_worker() {
        let mut config = zero_interval_config();
        config.step_interval_ms = 50;
        let controller = scripted_controller(1_000_000, config);
        controller.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;

        tokio::time::timeout(Duration::from_secs(2), controller.on_disconnect())
            .await
            .unwrap();
        assert!(!controller.is_running());
    }

    #[tokio::test]
    async fn disconnect_aborts_a_worker_wedged_in_the_sink() {
        let sink = Arc::new(StalledSink::new());
        let controller = SessionController::new(
            SessionId::new(),
            zero_interval_config(),
            Arc::new(ScriptedFactory::new(1_000_000)),
            Arc::new(FirstMoveSelector),
            Arc::clone(&sink) as Arc<dyn RenderSink>,
        );
        controller.start().await.unwrap();
        // Let the worker reach the sink and park there.
        tokio::time::sleep(Duration::from_millis(80)).await;

        tokio::time::timeout(
            Duration::from_secs(2),
            controller.teardown(Duration::from_millis(100)),
        )
        .await
        .unwrap();
        assert!(!controller.is_running());

        // A surviving worker would resume once the sink unblocks; an
        // aborted one cannot deliver anything.
        let frozen = controller.history().len().await;
        sink.release();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(sink.delivered(), 0);
        assert_eq!(controller.history().len().await, frozen);
        assert!(!controller.is_running());
    }

    #[tokio::test]
    async fn speed_change_keeps_status_and_config_in_agreement() {
        let controller = scripted_controller(4, zero_interval_config());
        controller.set_step_interval(250).await;

        let status = controller.status().await;
        assert_eq!(status.step_interval_ms, 250);
        assert_eq!(status.config.step_interval_ms, 250);
    }

    #[tokio::test]
    async fn disconnect_with_no_worker_is_immediate() {
        let controller = scripted_controller(4, zero_interval_config());
        tokio::time::timeout(Duration::from_millis(200), controller.on_disconnect())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn demo_engine_runs_end_to_end_with_two_participants() {
        let controller = SessionController::new(
            SessionId::new(),
            SessionConfig {
                participant_count: 2,
                step_interval_ms: 0,
                view_mode: ViewMode::Observer,
                randomized_start: false,
            },
            Arc::new(DemoEngineFactory::new()),
            Arc::new(RandomSelector::new()),
            Arc::new(NullRenderSink::new()),
        );
        controller.start().await.unwrap();
        wait_until_idle(&controller).await;

        let status = controller.status().await;
        assert_eq!(status.end_reason, Some(EndReason::Terminal));
        let newest = controller.history().latest().await.unwrap();
        assert!(newest.terminal);
        assert_eq!(newest.transition as usize, status.transitions);
    }
}
