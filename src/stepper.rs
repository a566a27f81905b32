use crate::error::Result;
use serde::Serialize;

/// Run/stop state of the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RunState {
    #[default]
    Stopped,
    Running,
}

impl RunState {
    pub fn name(&self) -> &str {
        match self {
            RunState::Stopped => "STOPPED",
            RunState::Running => "RUNNING",
        }
    }
}

/// What one call to [`Stepper::advance`] accomplished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Not running; nothing was done
    Idle,
    /// Batch finished and steps remain; call again on the next turn
    Pending { swept: u64 },
    /// The last requested step completed and the run stopped
    Done { swept: u64 },
}

/// Drives a requested number of sweeps in bounded batches.
///
/// The host calls [`advance`](Self::advance) once per turn. A stop request
/// lands between batches because nothing else runs while a batch is active.
#[derive(Debug, Clone)]
pub struct Stepper {
    state: RunState,
    cur_step: u64,
    remaining: u64,
    batch_size: usize,
}

impl Stepper {
    pub fn new(batch_size: usize) -> Self {
        Self {
            state: RunState::Stopped,
            cur_step: 0,
            remaining: 0,
            batch_size: batch_size.max(1),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn cur_step(&self) -> u64 {
        self.cur_step
    }

    /// Steps still owed to the current run
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Begin a run of `steps` sweeps. Returns `false` (and changes nothing)
    /// when a run is already in progress.
    pub fn start(&mut self, steps: u64) -> bool {
        if self.state == RunState::Running {
            return false;
        }
        self.remaining = steps;
        self.state = RunState::Running;
        true
    }

    /// Cancel the current run. Completed steps stay counted.
    pub fn stop(&mut self) {
        self.state = RunState::Stopped;
        self.remaining = 0;
    }

    /// Back to step 0, stopped
    pub fn reset(&mut self) {
        self.stop();
        self.cur_step = 0;
    }

    /// Execute up to one batch of sweeps.
    ///
    /// `sweep` runs a single step. If it fails, the sweeps completed before
    /// the failure are still counted, the run stops and the error is returned.
    pub fn advance<F>(&mut self, mut sweep: F) -> Result<BatchOutcome>
    where
        F: FnMut() -> Result<()>,
    {
        if self.state == RunState::Stopped {
            return Ok(BatchOutcome::Idle);
        }

        let quota = self.remaining.min(self.batch_size as u64);
        let mut swept = 0;
        while swept < quota {
            if let Err(err) = sweep() {
                self.cur_step += swept;
                self.stop();
                return Err(err);
            }
            swept += 1;
        }

        self.cur_step += swept;
        self.remaining -= swept;
        if self.remaining == 0 {
            self.state = RunState::Stopped;
            Ok(BatchOutcome::Done { swept })
        } else {
            Ok(BatchOutcome::Pending { swept })
        }
    }
}
