//! Error types for building and stepping a simulation

use thiserror::Error;

/// Result type for simulation operations
pub type SimResult<T> = Result<T, SimError>;

/// Problems found while turning configuration into a runnable scenario.
/// Always raised before the first inner step
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("need at least 2 bodies with positive mass, found {usable}")]
    TooFewBodies { usable: usize },

    #[error("body {index} has a {found}-component vector in a {expected}D run")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("unsupported dimension {0} (expected 2 or 3)")]
    UnsupportedDimension(u8),

    #[error("scenario is configured for {configured}D but a {requested}D run was requested")]
    RunDimension { configured: u8, requested: usize },

    #[error("unknown preset: {0}")]
    UnknownPreset(String),
}

/// Fatal conditions for an in-progress run. There is no recovery;
/// an aborted run has to be rebuilt from its configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("singular configuration: bodies {i} and {j} coincide (r2 = {r2:e})")]
    Singular { i: usize, j: usize, r2: f64 },

    #[error("non-finite state for body {index}")]
    NonFinite { index: usize },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("simulation worker panicked")]
    WorkerPanicked,
}
