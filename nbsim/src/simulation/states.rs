//! Core state types for the N-body simulation.
//!
//! `Body<D>` and `System<D>` are generic over the spatial dimension, so the
//! same force and integrator code drives both 2D (`D = 2`) and 3D (`D = 3`)
//! runs. Each system holds the ordered list of bodies and the current
//! simulated time `t`.

use nalgebra::SVector;

pub type NVec<const D: usize> = SVector<f64, D>;
pub type NVec2 = NVec<2>;
pub type NVec3 = NVec<3>;

#[derive(Debug, Clone, PartialEq)]
pub struct Body<const D: usize> {
    pub gm: f64, // gravitational parameter G * m
    pub x: NVec<D>, // position
    pub v: NVec<D>, // velocity
    pub tag: String, // display tag, passed through untouched
}

impl<const D: usize> Body<D> {
    /// Build a body from its mass; `gm` is fixed here for the whole run
    pub fn new(mass: f64, g: f64, x: NVec<D>, v: NVec<D>, tag: impl Into<String>) -> Self {
        Self {
            gm: g * mass,
            x,
            v,
            tag: tag.into(),
        }
    }
}

pub type Body2 = Body<2>;
pub type Body3 = Body<3>;

/// Ordered body store. Order only matters for indexing; the length is
/// fixed once stepping starts
#[derive(Debug, Clone, PartialEq)]
pub struct System<const D: usize> {
    pub bodies: Vec<Body<D>>,
    pub t: f64, // simulated time
}

pub type System2 = System<2>;
pub type System3 = System<3>;

impl<const D: usize> System<D> {
    pub fn new(bodies: Vec<Body<D>>) -> Self {
        Self { bodies, t: 0.0 }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Total momentum weighted by `gm` instead of `m` (i.e. `G * p`)
    pub fn momentum(&self) -> NVec<D> {
        self.bodies
            .iter()
            .fold(NVec::<D>::zeros(), |acc, b| acc + b.v * b.gm)
    }

    /// Center of mass. `G` cancels, so the `gm` weights give the exact value
    pub fn center_of_mass(&self) -> NVec<D> {
        let total: f64 = self.bodies.iter().map(|b| b.gm).sum();
        if total <= 0.0 {
            return NVec::<D>::zeros();
        }
        let weighted = self
            .bodies
            .iter()
            .fold(NVec::<D>::zeros(), |acc, b| acc + b.x * b.gm);
        weighted / total
    }

    /// Total energy multiplied by `G` (kinetic + pairwise potential)
    pub fn energy(&self) -> f64 {
        let kinetic: f64 = self
            .bodies
            .iter()
            .map(|b| 0.5 * b.gm * b.v.norm_squared())
            .sum();

        let mut potential = 0.0;
        for (i, bi) in self.bodies.iter().enumerate() {
            for bj in &self.bodies[i + 1..] {
                potential -= bi.gm * bj.gm / (bi.x - bj.x).norm();
            }
        }

        kinetic + potential
    }
}
