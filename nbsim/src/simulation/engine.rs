//! High-level runtime engine settings
//!
//! Selects dimension (2D/3D), integrator and run mode
//! used when building and running a `Scenario`

use crate::configuration::config::{EngineConfig, IntegratorConfig, ModeConfig};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Engine {
    pub dimension: u8, // 2 or 3
    pub integrator: IntegratorConfig, // kinematic or verlet
    pub mode: ModeConfig, // bulk or continuous
}

impl Engine {
    pub fn from_config(cfg: &EngineConfig) -> Result<Self, ConfigError> {
        let dimension = cfg.dimension.unwrap_or(2);
        if dimension != 2 && dimension != 3 {
            return Err(ConfigError::UnsupportedDimension(dimension));
        }
        Ok(Self {
            dimension,
            integrator: cfg.integrator,
            mode: cfg.mode,
        })
    }
}
