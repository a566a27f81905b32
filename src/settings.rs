use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Sweeps executed per batch before control returns to the host
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Respawn strategy - where a replacement particle appears after a freeze
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RespawnStrategy {
    /// Uniform over the bounding region
    #[default]
    Boxy,
    /// On a circle around the seed, radius from the region extent
    Radial,
}

impl RespawnStrategy {
    pub fn name(&self) -> &str {
        match self {
            RespawnStrategy::Boxy => "Boxy",
            RespawnStrategy::Radial => "Radial",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            RespawnStrategy::Boxy => RespawnStrategy::Radial,
            RespawnStrategy::Radial => RespawnStrategy::Boxy,
        }
    }

    /// Parse a user-facing name (case-insensitive)
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "boxy" | "box" | "uniform" => Ok(RespawnStrategy::Boxy),
            "radial" | "circle" | "ring" => Ok(RespawnStrategy::Radial),
            other => Err(Error::InvalidConfig(format!(
                "unknown respawn strategy '{other}' (expected boxy or radial)"
            ))),
        }
    }
}

/// All simulation settings consolidated into one struct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Grid width in cells; derived from the canvas when unset
    pub grid_width: Option<usize>,
    /// Grid height in cells; derived from the canvas when unset
    pub grid_height: Option<usize>,
    /// Number of concurrently diffusing particles
    pub num_particles: usize,
    /// Respawn strategy used after each freeze
    pub strategy: RespawnStrategy,
    /// Sweeps per batch
    pub batch_size: usize,
    /// RNG seed; drawn from entropy when unset
    pub rng_seed: Option<u64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            grid_width: None,
            grid_height: None,
            num_particles: 200,
            strategy: RespawnStrategy::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            rng_seed: None,
        }
    }
}

impl SimulationSettings {
    /// Fill in grid dimensions that were left unset
    pub fn with_default_size(mut self, width: usize, height: usize) -> Self {
        self.grid_width.get_or_insert(width);
        self.grid_height.get_or_insert(height);
        self
    }

    /// Resolved grid dimensions
    pub fn dimensions(&self) -> Result<(usize, usize)> {
        match (self.grid_width, self.grid_height) {
            (Some(w), Some(h)) => Ok((w, h)),
            _ => Err(Error::InvalidConfig("grid dimensions are not set".into())),
        }
    }

    /// Check that an engine can be built from these settings
    pub fn validate(&self) -> Result<()> {
        let (width, height) = self.dimensions()?;
        if width == 0 || height == 0 {
            return Err(Error::InvalidConfig(format!(
                "grid must be at least 1x1, got {width}x{height}"
            )));
        }
        if self.num_particles == 0 {
            return Err(Error::InvalidConfig("num_particles must be > 0".into()));
        }
        if self.num_particles > width * height {
            return Err(Error::InvalidConfig(format!(
                "num_particles ({}) exceeds grid area ({})",
                self.num_particles,
                width * height
            )));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be > 0".into()));
        }
        Ok(())
    }

    /// Adjust particle count (clamped to 1 and the grid area when known)
    pub fn adjust_particles(&mut self, delta: i64) {
        let max = match (self.grid_width, self.grid_height) {
            (Some(w), Some(h)) => (w * h).max(1) as i64,
            _ => i64::MAX,
        };
        self.num_particles = (self.num_particles as i64 + delta).clamp(1, max) as usize;
    }
}
