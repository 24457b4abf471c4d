//! Named two-body initial conditions
//!
//! All presets are planar, continuous-mode scenarios using an animation
//! step of 5e-7 and unit speed. Masses are in kg with `G` in SI units.

use std::str::FromStr;

use clap::ValueEnum;

use crate::configuration::config::{
    BodyConfig, EngineConfig, ModeConfig, ParametersConfig, ScenarioConfig,
};
use crate::error::ConfigError;
use crate::simulation::params::Parameters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Two equal masses circling their common center
    Twin,
    /// Two equal masses with unequal speeds; the pair drifts
    FlyingTwins,
    /// Light body on an elliptic orbit
    Elliptic,
    /// Light body on a circular orbit of radius 1
    Circular,
    /// Light body near escape speed
    Parabola,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Twin,
        Preset::FlyingTwins,
        Preset::Elliptic,
        Preset::Circular,
        Preset::Parabola,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Twin => "twin",
            Preset::FlyingTwins => "flying-twins",
            Preset::Elliptic => "elliptic",
            Preset::Circular => "circular",
            Preset::Parabola => "parabola",
        }
    }

    fn bodies(self) -> Vec<BodyConfig> {
        match self {
            Preset::Twin => vec![
                BodyConfig::new(1e10, &[-1.0, 0.0], &[0.0, -0.3], "blue"),
                BodyConfig::new(1e10, &[1.0, 0.0], &[0.0, 0.3], "red"),
            ],
            Preset::FlyingTwins => vec![
                BodyConfig::new(1e11, &[-1.0, 0.0], &[0.0, -0.3], "blue"),
                BodyConfig::new(1e11, &[1.0, 0.0], &[0.0, 0.4], "red"),
            ],
            Preset::Elliptic => vec![
                BodyConfig::new(1e10, &[-1.0, 0.0], &[0.0, 0.0], "yellow"),
                BodyConfig::new(1.0, &[1.0, 0.0], &[0.0, 0.2], "blue"),
            ],
            Preset::Circular => vec![
                BodyConfig::new(1e11, &[0.0, 0.0], &[0.0, 0.0], "yellow"),
                BodyConfig::new(1.0, &[1.0, 0.0], &[0.0, 2.58], "blue"),
            ],
            Preset::Parabola => vec![
                BodyConfig::new(1e11, &[0.0, 0.0], &[0.0, 0.0], "yellow"),
                BodyConfig::new(1.0, &[1.0, 0.0], &[0.0, 3.65], "blue"),
            ],
        }
    }

    pub fn config(self) -> ScenarioConfig {
        ScenarioConfig {
            engine: EngineConfig {
                dimension: Some(2),
                mode: ModeConfig::Continuous,
                ..Default::default()
            },
            parameters: ParametersConfig {
                h0: Some(Parameters::DEFAULT_ANIMATION_H0),
                speed: Some(1.0),
                ..Default::default()
            },
            bodies: self.bodies(),
        }
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}
