//! Single-flight execution with coalesced reruns.
//!
//! Used to serialize configuration reloads: overlapping triggers never run
//! the operation concurrently, and any number of triggers that arrive during
//! a run collapse into exactly one follow-up run.

use std::fmt::Display;

use parking_lot::Mutex;

/// Where the coalescer is in its run cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoalescerState {
    /// No run in flight.
    Idle,
    /// A run is in flight and nothing arrived since it started.
    Running,
    /// Running, and at least one trigger arrived since the run started.
    RunningWithRerun,
}

#[derive(Debug)]
pub struct ExecutionCoalescer {
    state: Mutex<CoalescerState>,
}

impl Default for ExecutionCoalescer {
    fn default() -> Self {
        return Self::new();
    }
}

impl ExecutionCoalescer {
    /// A coalescer in the `Idle` state.
    pub const fn new() -> Self {
        return Self {
            state: Mutex::new(CoalescerState::Idle),
        };
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> CoalescerState {
        return *self.state.lock();
    }

    /// Run `op`, or schedule a rerun if a run is already in flight.
    ///
    /// When idle, the caller drives the run and keeps rerunning `op` while
    /// triggers arrived during the previous run. When busy, the call only
    /// marks a rerun and returns `Ok(())` at once without observing any run.
    ///
    /// # Errors
    ///
    /// Returns the error of the run this call triggered. Failures of
    /// follow-up runs are logged and do not stop the rerun loop.
    pub fn execute<F, E>(&self, mut op: F) -> Result<(), E>
    where
        F: FnMut() -> Result<(), E>,
        E: Display,
    {
        {
            let mut state = self.state.lock();
            match *state {
                CoalescerState::Idle => *state = CoalescerState::Running,
                CoalescerState::Running | CoalescerState::RunningWithRerun => {
                    *state = CoalescerState::RunningWithRerun;
                    tracing::trace!("run in flight, rerun scheduled");
                    return Ok(());
                },
            }
        }

        let reset = ResetOnDrop(&self.state);
        let outcome = op();

        loop {
            {
                let mut state = self.state.lock();
                if *state != CoalescerState::RunningWithRerun {
                    *state = CoalescerState::Idle;
                    break;
                }
                *state = CoalescerState::Running;
            }

            tracing::debug!("rerunning coalesced operation");
            if let Err(e) = op() {
                tracing::warn!(error = %e, "coalesced rerun failed");
            }
        }

        reset.disarm();
        return outcome;
    }
}

/// Returns the coalescer to `Idle` if `op` panics, so later triggers still run.
struct ResetOnDrop<'a>(&'a Mutex<CoalescerState>);

impl ResetOnDrop<'_> {
    /// The run loop already left the state at `Idle`; another caller may own it now.
    fn disarm(self) {
        std::mem::forget(self);
    }
}

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        *self.0.lock() = CoalescerState::Idle;
    }
}
