//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - inner step size and the bulk-mode duration / sample count,
//! - continuous-mode speed and minimum emission interval,
//! - gravitational constant and the coincidence threshold
//!
//! Values here are already validated; fallbacks are applied while
//! reading the configuration.

use std::time::Duration;

/// Gravitational constant in SI units
pub const G_SI: f64 = 6.6743e-11;

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub G: f64, // gravitational constant
    pub h0: f64, // inner step size
    pub t_end: f64, // bulk mode total simulated duration
    pub samples: u32, // bulk mode snapshot count
    pub speed: f64, // simulated seconds per wall-clock second (continuous mode)
    pub min_interval: Duration, // floor between continuous-mode emissions
    pub min_separation2: f64, // r^2 below this aborts the run
}

impl Parameters {
    pub const DEFAULT_H0: f64 = 1.0e-6;
    pub const DEFAULT_ANIMATION_H0: f64 = 5.0e-7;
    pub const DEFAULT_T_END: f64 = 1.0;
    pub const DEFAULT_SAMPLES: u32 = 10_000;
    pub const DEFAULT_SPEED: f64 = 1.0;
    pub const DEFAULT_MIN_INTERVAL_MS: u64 = 10;
    pub const DEFAULT_MIN_SEPARATION2: f64 = 1.0e-18;
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            G: G_SI,
            h0: Self::DEFAULT_H0,
            t_end: Self::DEFAULT_T_END,
            samples: Self::DEFAULT_SAMPLES,
            speed: Self::DEFAULT_SPEED,
            min_interval: Duration::from_millis(Self::DEFAULT_MIN_INTERVAL_MS),
            min_separation2: Self::DEFAULT_MIN_SEPARATION2,
        }
    }
}
