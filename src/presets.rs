use crate::error::{Error, Result};
use crate::settings::{RespawnStrategy, SimulationSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// A named preset containing simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub description: String,
    pub settings: SimulationSettings,
}

impl Preset {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        settings: SimulationSettings,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            settings,
        }
    }
}

/// Manager for loading and saving presets
pub struct PresetManager {
    /// Built-in presets that ship with the app
    pub builtin: Vec<Preset>,
    /// User-created presets loaded from disk
    pub user: Vec<Preset>,
    dir: Option<PathBuf>,
}

impl Default for PresetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetManager {
    /// Built-in presets plus user presets from the config directory
    pub fn new() -> Self {
        Self::with_dir(Self::presets_dir())
    }

    /// Built-in presets plus user presets from `dir`
    pub fn with_dir(dir: Option<PathBuf>) -> Self {
        let mut manager = Self {
            builtin: Vec::new(),
            user: Vec::new(),
            dir,
        };
        manager.load_builtin_presets();
        manager.load_user_presets();
        manager
    }

    fn load_builtin_presets(&mut self) {
        self.builtin = vec![
            Preset::new(
                "Classic",
                "Boxy respawn with a moderate particle count",
                SimulationSettings::default(),
            ),
            Preset::new(
                "Radial Bloom",
                "Particles reappear on a ring at the structure's reach",
                SimulationSettings {
                    strategy: RespawnStrategy::Radial,
                    num_particles: 300,
                    ..Default::default()
                },
            ),
            Preset::new(
                "Crowded",
                "Many walkers; dense, fast growth",
                SimulationSettings {
                    num_particles: 2_000,
                    ..Default::default()
                },
            ),
            Preset::new(
                "Sparse",
                "A handful of walkers; thin, long branches",
                SimulationSettings {
                    num_particles: 20,
                    ..Default::default()
                },
            ),
            Preset::new(
                "Pocket",
                "Small fixed grid that saturates quickly",
                SimulationSettings {
                    grid_width: Some(48),
                    grid_height: Some(32),
                    num_particles: 60,
                    batch_size: 10,
                    ..Default::default()
                },
            ),
        ];
    }

    /// Get the presets directory path
    fn presets_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dla-stepper").join("presets"))
    }

    /// Load user presets from disk; unreadable files are skipped
    fn load_user_presets(&mut self) {
        let Some(dir) = &self.dir else { return };
        let Ok(entries) = fs::read_dir(dir) else { return };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            let parsed = fs::read_to_string(&path)
                .map_err(Error::from)
                .and_then(|content| serde_json::from_str::<Preset>(&content).map_err(Error::from));
            match parsed {
                Ok(preset) => self.user.push(preset),
                Err(err) => warn!(path = %path.display(), %err, "skipping preset file"),
            }
        }
    }

    fn file_name(name: &str) -> String {
        name.chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect()
    }

    fn require_dir(&self) -> Result<&PathBuf> {
        self.dir
            .as_ref()
            .ok_or_else(|| Error::InvalidConfig("could not determine config directory".into()))
    }

    /// Save a preset to disk
    pub fn save_preset(&mut self, preset: Preset) -> Result<()> {
        let dir = self.require_dir()?;
        fs::create_dir_all(dir)?;

        let path = dir.join(format!("{}.json", Self::file_name(&preset.name)));
        let json = serde_json::to_string_pretty(&preset)?;
        fs::write(&path, json)?;

        match self.user.iter_mut().find(|p| p.name == preset.name) {
            Some(existing) => *existing = preset,
            None => self.user.push(preset),
        }
        Ok(())
    }

    /// Delete a user preset
    pub fn delete_preset(&mut self, name: &str) -> Result<()> {
        let path = self
            .require_dir()?
            .join(format!("{}.json", Self::file_name(name)));

        self.user.retain(|p| p.name != name);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Get all presets (builtin + user)
    pub fn all_presets(&self) -> impl Iterator<Item = &Preset> {
        self.builtin.iter().chain(self.user.iter())
    }

    /// Find a preset by name
    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.all_presets().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Get preset names for display
    pub fn preset_names(&self) -> Vec<&str> {
        self.all_presets().map(|p| p.name.as_str()).collect()
    }
}
