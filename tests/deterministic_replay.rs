use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use dla_stepper::{BatchOutcome, RespawnStrategy, SimulationEngine, SimulationSettings, Snapshot};

#[derive(Debug, Clone, Copy)]
enum Command {
    Run(u64),
    Select(RespawnStrategy),
    Stop,
}

fn settings(seed: u64, batch_size: usize) -> SimulationSettings {
    SimulationSettings {
        grid_width: Some(96),
        grid_height: Some(72),
        num_particles: 40,
        batch_size,
        rng_seed: Some(seed),
        ..Default::default()
    }
}

fn scripted_commands() -> Vec<Command> {
    vec![
        Command::Run(150),
        Command::Select(RespawnStrategy::Radial),
        Command::Run(90),
        Command::Stop,
        Command::Select(RespawnStrategy::Boxy),
        Command::Run(60),
    ]
}

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    batches: Vec<(BatchOutcome, u64, usize)>,
    final_state: Snapshot,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.final_state.cur_step.hash(&mut hasher);
        self.final_state.fixed_cells.hash(&mut hasher);
        for p in &self.final_state.particles {
            (p.x, p.y).hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// Apply each command and drain the run it starts, recording every batch
fn replay(seed: u64, batch_size: usize, commands: &[Command]) -> ReplayOutcome {
    let mut engine = SimulationEngine::new(settings(seed, batch_size)).expect("engine builds");
    let mut batches = Vec::new();

    for command in commands {
        match *command {
            Command::Run(steps) => {
                engine.run(steps).expect("run accepted");
            }
            Command::Select(strategy) => {
                assert!(engine.select_strategy(strategy));
            }
            Command::Stop => engine.stop(),
        }
        loop {
            let outcome = engine.step_batch().expect("grid does not saturate");
            if outcome == BatchOutcome::Idle {
                break;
            }
            batches.push((outcome, engine.cur_step(), engine.fixed_count()));
        }
    }

    ReplayOutcome {
        batches,
        final_state: engine.snapshot(),
    }
}

#[test]
fn test_deterministic_replay_produces_identical_runs() {
    let first = replay(0x5eed, 25, &scripted_commands());
    let second = replay(0x5eed, 25, &scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_eq!(first.final_state.cur_step, 300);
    assert!(first.final_state.fixed_cells.len() > 1);
}

#[test]
fn test_batch_boundaries_do_not_change_the_result() {
    let fine = replay(42, 1, &scripted_commands());
    let coarse = replay(42, 100, &scripted_commands());

    assert_eq!(fine.batches.len(), 300);
    assert_eq!(fine.final_state, coarse.final_state);
}

#[test]
fn test_stopping_and_resuming_matches_a_continuous_run() {
    let mut continuous = SimulationEngine::new(settings(7, 10)).expect("engine builds");
    continuous.run(200).expect("run accepted");
    while let BatchOutcome::Pending { .. } = continuous.step_batch().expect("no saturation") {}

    let mut interrupted = SimulationEngine::new(settings(7, 10)).expect("engine builds");
    interrupted.run(200).expect("run accepted");
    for _ in 0..7 {
        interrupted.step_batch().expect("no saturation");
    }
    interrupted.stop();
    assert_eq!(interrupted.cur_step(), 70);
    interrupted.run(130).expect("run accepted");
    while let BatchOutcome::Pending { .. } = interrupted.step_batch().expect("no saturation") {}

    assert_eq!(continuous.snapshot(), interrupted.snapshot());
}

#[test]
fn test_different_seeds_diverge() {
    let a = replay(1, 50, &scripted_commands());
    let b = replay(2, 50, &scripted_commands());
    assert_ne!(a.fingerprint(), b.fingerprint());
}

#[test]
fn test_snapshot_serializes_to_json() {
    let outcome = replay(3, 50, &[Command::Run(20)]);
    let json = serde_json::to_value(&outcome.final_state).expect("snapshot serializes");

    assert_eq!(json["cur_step"], 20);
    assert_eq!(json["run_state"], "Stopped");
    assert_eq!(json["strategy"], "Boxy");
    assert_eq!(json["particles"].as_array().map(Vec::len), Some(40));
}
