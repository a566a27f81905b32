use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the engine and its settings, config and preset layers
#[derive(Debug, Error)]
pub enum Error {
    /// Step count was non-numeric or not positive. No state was changed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A respawn could not find a free cell away from the structure.
    #[error("grid saturated: no free cell found after {attempts} respawn attempts")]
    SaturationExhausted { attempts: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for errors that end the current run and require a reset.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::SaturationExhausted { .. })
    }
}
