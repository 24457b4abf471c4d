//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! `Scenario<D>` containing:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - system state (`System<D>` with bodies at t = 0)
//! - active force set (`AccelSet<D>`)
//!
//! This is the only place where input is validated. Bodies without a
//! positive mass are dropped, missing vector components become 0, and bad
//! parameters fall back to their defaults. Vectors longer than the run's
//! dimension are rejected outright.

use std::time::Duration;

use tracing::{info, warn};

use crate::configuration::config::{BodyConfig, ModeConfig, ParametersConfig, ScenarioConfig};
use crate::error::ConfigError;
use crate::simulation::engine::Engine;
use crate::simulation::forces::AccelSet;
use crate::simulation::params::{Parameters, G_SI};
use crate::simulation::states::{Body, NVec, System};

pub const DEFAULT_TAG: &str = "blue";

/// A fully-initialized simulation: the run context a scheduler takes
/// ownership of for the duration of a run
pub struct Scenario<const D: usize> {
    pub engine: Engine,
    pub parameters: Parameters,
    pub system: System<D>,
    pub forces: AccelSet<D>,
}

pub type Scenario2D = Scenario<2>;
pub type Scenario3D = Scenario<3>;

impl<const D: usize> Scenario<D> {
    pub fn build_scenario(cfg: &ScenarioConfig) -> Result<Self, ConfigError> {
        let engine = Engine::from_config(&cfg.engine)?;
        if engine.dimension as usize != D {
            return Err(ConfigError::RunDimension {
                configured: engine.dimension,
                requested: D,
            });
        }

        let parameters = build_parameters(&cfg.parameters, engine.mode);
        let bodies = build_bodies::<D>(&cfg.bodies, parameters.G)?;
        if bodies.len() < 2 {
            return Err(ConfigError::TooFewBodies {
                usable: bodies.len(),
            });
        }

        info!(
            bodies = bodies.len(),
            dimension = D,
            integrator = ?engine.integrator,
            mode = ?engine.mode,
            "scenario built"
        );

        let forces = AccelSet::gravity(parameters.min_separation2);
        Ok(Self {
            engine,
            parameters,
            system: System::new(bodies),
            forces,
        })
    }
}

/// Scenario of either dimension, picked by `engine.dimension`
pub enum AnyScenario {
    Planar(Scenario2D),
    Spatial(Scenario3D),
}

impl AnyScenario {
    pub fn build(cfg: &ScenarioConfig) -> Result<Self, ConfigError> {
        match cfg.dimension() {
            2 => Scenario::build_scenario(cfg).map(AnyScenario::Planar),
            3 => Scenario::build_scenario(cfg).map(AnyScenario::Spatial),
            other => Err(ConfigError::UnsupportedDimension(other)),
        }
    }
}

/// Map `BodyConfig` -> runtime `Body` for a `D`-dimensional run
pub fn build_bodies<const D: usize>(cfgs: &[BodyConfig], g: f64) -> Result<Vec<Body<D>>, ConfigError> {
    // Reject mixed dimensions first, even for bodies that would be dropped
    for (index, bc) in cfgs.iter().enumerate() {
        let found = bc.x.len().max(bc.v.len());
        if found > D {
            return Err(ConfigError::DimensionMismatch {
                index,
                expected: D,
                found,
            });
        }
    }

    let mut bodies = Vec::with_capacity(cfgs.len());
    for (index, bc) in cfgs.iter().enumerate() {
        let m = match bc.m {
            Some(m) if m > 0.0 => m,
            other => {
                warn!(index, mass = ?other, "dropping body without a positive mass");
                continue;
            }
        };

        bodies.push(Body::new(
            m,
            g,
            padded::<D>(&bc.x),
            padded::<D>(&bc.v),
            bc.tag.as_deref().unwrap_or(DEFAULT_TAG),
        ));
    }

    Ok(bodies)
}

fn padded<const D: usize>(components: &[f64]) -> NVec<D> {
    NVec::<D>::from_fn(|k, _| components.get(k).copied().unwrap_or(0.0))
}

/// Parameters (runtime) from ParametersConfig, applying fallbacks
pub fn build_parameters(cfg: &ParametersConfig, mode: ModeConfig) -> Parameters {
    let default_h0 = match mode {
        ModeConfig::Bulk => Parameters::DEFAULT_H0,
        ModeConfig::Continuous => Parameters::DEFAULT_ANIMATION_H0,
    };

    let samples = positive_or("samples", cfg.samples, Parameters::DEFAULT_SAMPLES as f64);
    let min_interval_ms = positive_or(
        "min_interval_ms",
        cfg.min_interval_ms,
        Parameters::DEFAULT_MIN_INTERVAL_MS as f64,
    );

    Parameters {
        G: positive_or("G", cfg.G, G_SI),
        h0: positive_or("h0", cfg.h0, default_h0),
        t_end: positive_or("t_end", cfg.t_end, Parameters::DEFAULT_T_END),
        samples: samples.ceil().min(u32::MAX as f64) as u32,
        speed: positive_or("speed", cfg.speed, Parameters::DEFAULT_SPEED),
        min_interval: interval_or_default(min_interval_ms),
        min_separation2: positive_or(
            "min_separation2",
            cfg.min_separation2,
            Parameters::DEFAULT_MIN_SEPARATION2,
        ),
    }
}

fn interval_or_default(ms: f64) -> Duration {
    let default = Duration::from_millis(Parameters::DEFAULT_MIN_INTERVAL_MS);
    Duration::try_from_secs_f64(ms / 1000.0).unwrap_or_else(|_| {
        warn!(parameter = "min_interval_ms", value = ms, "interval out of range, using default");
        default
    })
}

fn positive_or(name: &'static str, value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v > 0.0 => v,
        Some(v) => {
            warn!(parameter = name, value = v, default, "non-positive parameter, using default");
            default
        }
        None => default,
    }
}
