//! Cooperative suspension primitive for one session's worker.
//!
//! A [`PauseGate`] is shared between the command path (the request
//! handlers invoking pause/resume/speed/stop) and the worker task. The
//! three control fields are atomics for lock-free reads on the worker's
//! hot path; a [`Notify`] serves as the monitor, so any control change
//! takes effect within one wait-cycle rather than only after a timeout.
//!
//! Exactly one worker waits on a gate at a time. [`Notify::notify_one`]
//! stores a permit when no waiter is registered, which closes the
//! check-then-wait race: a signal arriving between the worker's
//! condition check and its `notified().await` is never lost.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Notify;

/// Pause/resume/step-rate/cancel control over a running worker.
#[derive(Debug)]
pub struct PauseGate {
    /// Whether the worker should hold before its next transition.
    paused: AtomicBool,

    /// True while the worker should keep running.
    active: AtomicBool,

    /// Delay between transitions in milliseconds (0 = no throttling).
    step_interval_ms: AtomicU64,

    /// Monitor used both to signal control changes and to perform
    /// interruptible timed waits.
    change: Notify,
}

impl PauseGate {
    /// Create a gate with the given step interval, unpaused and inactive.
    ///
    /// A gate starts inactive; [`reset`](Self::reset) arms it when a run
    /// begins.
    pub const fn new(step_interval_ms: u64) -> Self {
        Self {
            paused: AtomicBool::new(false),
            active: AtomicBool::new(false),
            step_interval_ms: AtomicU64::new(step_interval_ms),
            change: Notify::const_new(),
        }
    }

    /// Wake the waiting worker immediately.
    ///
    /// Called on every mutation of `paused`, `active`, or the step
    /// interval so the change is observed at the current suspension
    /// point, not the next one.
    pub fn signal_change(&self) {
        self.change.notify_one();
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Check whether the gate is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause the worker before its next transition.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
        self.signal_change();
    }

    /// Resume the worker, also cutting short any pending interval wait.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.signal_change();
    }

    /// Suspend the caller while paused.
    ///
    /// Returns immediately if not paused. Otherwise blocks until
    /// [`resume`](Self::resume) or [`stop`](Self::stop) is called. Does
    /// not spin; the condition is re-checked after every wakeup.
    pub async fn wait_if_paused(&self) {
        while self.paused.load(Ordering::Acquire) && self.active.load(Ordering::Acquire) {
            self.change.notified().await;
        }
    }

    // -----------------------------------------------------------------------
    // Stop / reset
    // -----------------------------------------------------------------------

    /// Check whether the worker should keep running.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Request cooperative cancellation. Idempotent.
    pub fn stop(&self) {
        self.active.store(false, Ordering::Release);
        self.signal_change();
    }

    /// Arm the gate for a new run: active, unpaused.
    ///
    /// The step interval is preserved across runs; only the lifecycle
    /// flags are reset.
    pub fn reset(&self) {
        self.active.store(true, Ordering::Release);
        self.paused.store(false, Ordering::Release);
    }

    // -----------------------------------------------------------------------
    // Step interval
    // -----------------------------------------------------------------------

    /// Get the current step interval in milliseconds.
    pub fn step_interval_ms(&self) -> u64 {
        self.step_interval_ms.load(Ordering::Acquire)
    }

    /// Set the step interval in milliseconds (0 = no throttling).
    ///
    /// The new rate applies to the very next wait: any wait currently in
    /// progress is interrupted.
    pub fn set_step_interval_ms(&self, ms: u64) {
        self.step_interval_ms.store(ms, Ordering::Release);
        self.signal_change();
    }

    /// Suspend for up to the configured step interval, or until
    /// [`signal_change`](Self::signal_change), whichever comes first.
    ///
    /// Returns immediately when the interval is 0. An early wakeup is
    /// never an error; the worker re-checks all conditions at the top of
    /// its loop.
    pub async fn wait_step_interval(&self) {
        let ms = self.step_interval_ms.load(Ordering::Acquire);
        if ms == 0 {
            return;
        }
        let _ = tokio::time::timeout(Duration::from_millis(ms), self.change.notified()).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[test]
    fn new_gate_is_idle_and_unpaused() {
        let gate = PauseGate::new(1000);
        assert!(!gate.is_paused());
        assert!(!gate.is_active());
        assert_eq!(gate.step_interval_ms(), 1000);
    }

    #[test]
    fn gate_constructs_in_const_context() {
        static GATE: PauseGate = PauseGate::new(250);
        assert_eq!(GATE.step_interval_ms(), 250);
        assert!(!GATE.is_active());
    }

    #[test]
    fn reset_arms_the_gate() {
        let gate = PauseGate::new(0);
        gate.pause();
        gate.reset();
        assert!(gate.is_active());
        assert!(!gate.is_paused());
    }

    #[test]
    fn stop_is_idempotent() {
        let gate = PauseGate::new(0);
        gate.reset();
        gate.stop();
        assert!(!gate.is_active());
        gate.stop();
        assert!(!gate.is_active());
    }

    #[tokio::test]
    async fn wait_if_paused_returns_immediately_when_unpaused() {
        let gate = PauseGate::new(0);
        gate.reset();
        // Must not hang.
        tokio::time::timeout(Duration::from_millis(100), gate.wait_if_paused())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn resume_wakes_a_paused_waiter() {
        let gate = Arc::new(PauseGate::new(0));
        gate.reset();
        gate.pause();

        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.wait_if_paused().await })
        };

        // Give the waiter time to block.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        gate.resume();
        tokio::time::timeout(Duration::from_secs(2), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn stop_wakes_a_paused_waiter() {
        let gate = Arc::new(PauseGate::new(0));
        gate.reset();
        gate.pause();

        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.wait_if_paused().await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        gate.stop();
        tokio::time::timeout(Duration::from_secs(2), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn resume_racing_the_pause_check_is_not_lost() {
        // resume() stores a permit when no waiter is registered, so a
        // signal between the condition check and the await still wakes.
        let gate = Arc::new(PauseGate::new(0));
        gate.reset();
        gate.pause();
        gate.resume();
        tokio::time::timeout(Duration::from_millis(100), gate.wait_if_paused())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn zero_interval_does_not_wait() {
        let gate = PauseGate::new(0);
        gate.reset();
        tokio::time::timeout(Duration::from_millis(50), gate.wait_step_interval())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn signal_interrupts_a_long_interval_wait() {
        let gate = Arc::new(PauseGate::new(60_000));
        gate.reset();

        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.wait_step_interval().await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        gate.signal_change();
        tokio::time::timeout(Duration::from_secs(2), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn rate_change_applies_to_the_next_wait() {
        let gate = Arc::new(PauseGate::new(60_000));
        gate.reset();

        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                // First wait is interrupted by the rate change; the next
                // one uses the new (zero) interval and returns at once.
                gate.wait_step_interval().await;
                gate.wait_step_interval().await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        gate.set_step_interval_ms(0);
        tokio::time::timeout(Duration::from_secs(2), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(gate.step_interval_ms(), 0);
    }
}
