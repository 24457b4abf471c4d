//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – dimension, integrator and run mode
//! - [`ParametersConfig`] – numerical parameters and physical constants
//! - [`BodyConfig`]       – initial state for each body
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! Every numeric field is read leniently: numbers, numeric strings and
//! missing values are all accepted. Anything that does not give a finite
//! number is treated as absent, so the builder falls back to its default
//! instead of letting a NaN reach the integrator.
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   dimension: 2            # 2 or 3
//!   integrator: kinematic   # or verlet
//!   mode: bulk              # or continuous
//!
//! parameters:
//!   G: 6.6743e-11
//!   h0: 1.0e-6              # inner step size
//!   t_end: 1.0              # bulk: total simulated time
//!   samples: 10000          # bulk: snapshots over t_end
//!   speed: 1.0              # continuous: simulated seconds per wall second
//!   min_interval_ms: 10     # continuous: emission floor
//!
//! bodies:
//!   - m: 1.0e11
//!     x: [0.0, 0.0]
//!     tag: yellow
//!   - m: 1.0
//!     x: [1.0, 0.0]
//!     v: [0.0, 2.58]
//!     tag: blue
//! ```

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

/// Which integrator advances the system
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegratorConfig {
    #[serde(rename = "kinematic")] // x + v dt + a dt^2/2, one force evaluation per step
    #[default]
    Kinematic,

    #[serde(rename = "verlet")] // velocity Verlet, two force evaluations per step
    Verlet,
}

/// How the scheduler drives the integrator
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeConfig {
    #[serde(rename = "bulk")] // run to t_end synchronously
    #[default]
    Bulk,

    #[serde(rename = "continuous")] // timer driven until cancelled
    Continuous,
}

/// High-level engine configuration
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub dimension: Option<u8>, // 2 or 3, defaults to 2
    pub integrator: IntegratorConfig,
    pub mode: ModeConfig,
}

/// Global numerical and physical parameters; `None` means "use the default"
#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ParametersConfig {
    #[serde(deserialize_with = "lenient_f64")]
    pub G: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub h0: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub t_end: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub samples: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub speed: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub min_interval_ms: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub min_separation2: Option<f64>,
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct BodyConfig {
    #[serde(deserialize_with = "lenient_f64")]
    pub m: Option<f64>, // mass; absent or non-positive drops the body
    #[serde(deserialize_with = "lenient_vec")]
    pub x: Vec<f64>, // position, missing components are 0
    #[serde(deserialize_with = "lenient_vec")]
    pub v: Vec<f64>, // velocity, missing components are 0
    pub tag: Option<String>, // opaque display tag
}

impl BodyConfig {
    pub fn new(m: f64, x: &[f64], v: &[f64], tag: &str) -> Self {
        Self {
            m: Some(m),
            x: x.to_vec(),
            v: v.to_vec(),
            tag: Some(tag.to_string()),
        }
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    pub bodies: Vec<BodyConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml(src: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(src)
    }

    pub fn dimension(&self) -> u8 {
        self.engine.dimension.unwrap_or(2)
    }
}

fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number(&value))
}

fn lenient_vec<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Sequence(items) => items.iter().map(|v| number(v).unwrap_or(0.0)).collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = ScenarioConfig::from_yaml("{}").unwrap();
        assert_eq!(cfg.dimension(), 2);
        assert_eq!(cfg.engine.integrator, IntegratorConfig::Kinematic);
        assert_eq!(cfg.engine.mode, ModeConfig::Bulk);
        assert!(cfg.bodies.is_empty());
        assert!(cfg.parameters.h0.is_none());
    }

    #[test]
    fn bad_numbers_read_as_absent() {
        let src = r#"
parameters:
  h0: "abc"
  speed: .nan
  t_end: "2.5"
bodies:
  - m: "1e11"
    x: [1.0, "oops", .inf]
    tag: red
  - x: [3.0]
"#;
        let cfg = ScenarioConfig::from_yaml(src).unwrap();
        assert_eq!(cfg.parameters.h0, None);
        assert_eq!(cfg.parameters.speed, None);
        assert_eq!(cfg.parameters.t_end, Some(2.5));

        assert_eq!(cfg.bodies[0].m, Some(1e11));
        assert_eq!(cfg.bodies[0].x, vec![1.0, 0.0, 0.0]);
        assert!(cfg.bodies[0].v.is_empty());
        assert_eq!(cfg.bodies[0].tag.as_deref(), Some("red"));

        assert_eq!(cfg.bodies[1].m, None);
        assert_eq!(cfg.bodies[1].tag, None);
    }

    #[test]
    fn engine_section_parses() {
        let src = "engine:\n  dimension: 3\n  integrator: verlet\n  mode: continuous\n";
        let cfg = ScenarioConfig::from_yaml(src).unwrap();
        assert_eq!(cfg.dimension(), 3);
        assert_eq!(cfg.engine.integrator, IntegratorConfig::Verlet);
        assert_eq!(cfg.engine.mode, ModeConfig::Continuous);
    }
}
