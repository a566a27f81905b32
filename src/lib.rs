pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod particles;
pub mod presets;
pub mod region;
pub mod settings;
pub mod stepper;

pub use engine::{RunRequest, SimulationEngine, Snapshot};
pub use error::{Error, Result};
pub use settings::{RespawnStrategy, SimulationSettings};
pub use stepper::{BatchOutcome, RunState};
