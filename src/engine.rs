use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::particles::{Particle, ParticleSet};
use crate::region::BoundingRegion;
use crate::settings::{RespawnStrategy, SimulationSettings};
use crate::stepper::{BatchOutcome, RunState, Stepper};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// Result of a `run` request that was not rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunRequest {
    Started,
    /// A run was already in progress; the request was dropped
    AlreadyRunning,
}

/// Serializable view of the observable state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub width: usize,
    pub height: usize,
    pub cur_step: u64,
    pub run_state: RunState,
    pub strategy: RespawnStrategy,
    pub region: BoundingRegion,
    pub fixed_cells: Vec<(usize, usize)>,
    pub particles: Vec<Particle>,
}

/// Parse a step count typed by a user. Only positive integers are accepted.
pub fn parse_step_count(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    match trimmed.parse::<u64>() {
        Ok(0) => Err(Error::InvalidInput("step count must be positive".into())),
        Ok(steps) => Ok(steps),
        Err(_) => Err(Error::InvalidInput(format!("'{trimmed}' is not a step count"))),
    }
}

/// Grid, region, particles and stepper behind one owner. Hosts issue
/// commands and read state through this type.
pub struct SimulationEngine {
    settings: SimulationSettings,
    seed: u64,
    grid: Grid,
    region: BoundingRegion,
    particles: ParticleSet,
    stepper: Stepper,
    strategy: RespawnStrategy,
    rng: StdRng,
    saturated: bool,
}

impl SimulationEngine {
    /// Build an engine from validated settings. Fails with
    /// `SaturationExhausted` when the grid cannot hold the initial particles.
    pub fn new(settings: SimulationSettings) -> Result<Self> {
        settings.validate()?;
        let (width, height) = settings.dimensions()?;
        let seed = settings.rng_seed.unwrap_or_else(rand::random);
        let (grid, region, particles, rng) =
            Self::initial_state(width, height, settings.num_particles, settings.strategy, seed)?;

        let engine = Self {
            strategy: settings.strategy,
            stepper: Stepper::new(settings.batch_size),
            settings,
            seed,
            grid,
            region,
            particles,
            rng,
            saturated: false,
        };
        info!(
            width,
            height,
            particles = engine.particles.len(),
            strategy = engine.strategy.name(),
            seed,
            "engine created"
        );
        Ok(engine)
    }

    /// Seed-only grid, its region, freshly spawned particles and the RNG
    /// that drew them
    fn initial_state(
        width: usize,
        height: usize,
        count: usize,
        strategy: RespawnStrategy,
        seed: u64,
    ) -> Result<(Grid, BoundingRegion, ParticleSet, StdRng)> {
        let grid = Grid::new(width, height);
        let region = BoundingRegion::around_seed(grid.seed(), width, height);
        let mut rng = StdRng::seed_from_u64(seed);
        let particles = ParticleSet::spawn(count, strategy, &grid, &region, &mut rng)?;
        Ok((grid, region, particles, rng))
    }

    /// Rebuild grid, region and particles; step count back to 0, stopped.
    ///
    /// The RNG is reseeded, so a reset engine replays the same run. If the
    /// particles cannot be placed, nothing is replaced and the engine stays
    /// saturated until a reset succeeds.
    pub fn reset(&mut self) -> Result<()> {
        self.stepper.stop();
        let fresh = Self::initial_state(
            self.grid.width(),
            self.grid.height(),
            self.settings.num_particles,
            self.strategy,
            self.seed,
        );
        let (grid, region, particles, rng) = match fresh {
            Ok(state) => state,
            Err(err) => {
                self.saturated = true;
                error!(%err, strategy = self.strategy.name(), "reset failed");
                return Err(err);
            }
        };

        self.grid = grid;
        self.region = region;
        self.particles = particles;
        self.rng = rng;
        self.stepper.reset();
        self.saturated = false;
        info!(seed = self.seed, strategy = self.strategy.name(), "engine reset");
        Ok(())
    }

    /// Request `steps` sweeps. Rejected with `InvalidInput` for zero and with
    /// `SaturationExhausted` if an earlier run saturated the grid.
    pub fn run(&mut self, steps: u64) -> Result<RunRequest> {
        if steps == 0 {
            return Err(Error::InvalidInput("step count must be positive".into()));
        }
        if self.saturated {
            return Err(Error::SaturationExhausted {
                attempts: crate::particles::MAX_RESPAWN_ATTEMPTS,
            });
        }
        if !self.stepper.start(steps) {
            warn!(steps, "run requested while running; ignored");
            return Ok(RunRequest::AlreadyRunning);
        }
        info!(steps, from_step = self.stepper.cur_step(), "run started");
        Ok(RunRequest::Started)
    }

    /// `run` with a step count typed by a user
    pub fn run_input(&mut self, input: &str) -> Result<RunRequest> {
        let steps = parse_step_count(input)?;
        self.run(steps)
    }

    /// Cancel the current run at the batch boundary. No-op when stopped.
    pub fn stop(&mut self) {
        if self.stepper.state() == RunState::Running {
            info!(at_step = self.stepper.cur_step(), remaining = self.stepper.remaining(), "run stopped");
        }
        self.stepper.stop();
    }

    /// Change the respawn strategy. Only honoured while stopped; returns
    /// whether the change took effect.
    pub fn select_strategy(&mut self, strategy: RespawnStrategy) -> bool {
        if self.stepper.state() == RunState::Running {
            warn!(requested = strategy.name(), "strategy change while running; ignored");
            return false;
        }
        self.strategy = strategy;
        self.settings.strategy = strategy;
        true
    }

    /// Execute one batch. Hosts call this once per turn until it stops
    /// returning [`BatchOutcome::Pending`].
    pub fn step_batch(&mut self) -> Result<BatchOutcome> {
        let Self {
            grid,
            region,
            particles,
            stepper,
            strategy,
            rng,
            saturated,
            ..
        } = self;
        let strategy = *strategy;

        let result = stepper.advance(|| particles.sweep(grid, region, strategy, rng).map(|_| ()));
        match &result {
            Ok(BatchOutcome::Pending { swept }) => {
                debug!(swept, cur_step = stepper.cur_step(), fixed = grid.fixed_count(), "batch done")
            }
            Ok(BatchOutcome::Done { swept }) => {
                info!(swept, cur_step = stepper.cur_step(), fixed = grid.fixed_count(), "run finished")
            }
            Ok(BatchOutcome::Idle) => {}
            Err(err) => {
                *saturated = true;
                error!(%err, cur_step = stepper.cur_step(), fixed = grid.fixed_count(), "run aborted");
            }
        }
        result
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn occupied(&self, x: usize, y: usize) -> bool {
        self.grid.occupied(x, y)
    }

    /// Full row-major occupancy buffer
    pub fn occupancy(&self) -> &[bool] {
        self.grid.cells()
    }

    pub fn fixed_count(&self) -> usize {
        self.grid.fixed_count()
    }

    pub fn particles(&self) -> &[Particle] {
        self.particles.as_slice()
    }

    pub fn cur_step(&self) -> u64 {
        self.stepper.cur_step()
    }

    pub fn remaining_steps(&self) -> u64 {
        self.stepper.remaining()
    }

    pub fn run_state(&self) -> RunState {
        self.stepper.state()
    }

    pub fn strategy(&self) -> RespawnStrategy {
        self.strategy
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    pub fn region(&self) -> &BoundingRegion {
        &self.region
    }

    /// True once a run has hit the respawn bound; cleared by `reset`
    pub fn is_saturated(&self) -> bool {
        self.saturated
    }

    /// RNG seed in use, for replaying a run
    pub fn rng_seed(&self) -> u64 {
        self.seed
    }

    /// Settings the engine was built with, including the current strategy
    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.grid.width(),
            height: self.grid.height(),
            cur_step: self.stepper.cur_step(),
            run_state: self.stepper.state(),
            strategy: self.strategy,
            region: self.region,
            fixed_cells: self.grid.fixed_cells(),
            particles: self.particles.as_slice().to_vec(),
        }
    }
}
