//! Force / acceleration contributors for the n-body engine
//!
//! Defines the dimension-generic acceleration trait and direct pairwise
//! Newtonian gravity. Accelerations are always recomputed from scratch
//! for the configuration passed in; nothing is cached between steps.

use tracing::error;

use crate::error::{SimError, SimResult};
use crate::simulation::states::{NVec, System};

/// Collection of acceleration terms.
/// Each term implements [`Acceleration`] and their contributions are summed
/// into a single acceleration vector per body
pub struct AccelSet<const D: usize> {
    terms: Vec<Box<dyn Acceleration<D> + Send + Sync>>,
}

impl<const D: usize> AccelSet<D> {
    /// Create an empty acceleration set
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Set holding only direct Newtonian gravity
    pub fn gravity(min_separation2: f64) -> Self {
        Self::new().with(NewtonianGravity { min_separation2 })
    }

    /// Add an acceleration term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: Acceleration<D> + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    /// Compute total accelerations at time `t` for all bodies in `sys`
    /// - `out[i]` will be set to the sum of contributions from all terms
    /// - fails if any term fails or any resulting component is not finite
    pub fn accumulate_accels(&self, t: f64, sys: &System<D>, out: &mut [NVec<D>]) -> SimResult<()> {
        for a in out.iter_mut() {
            *a = NVec::<D>::zeros();
        }
        for term in &self.terms {
            term.acceleration(t, sys, out)?;
        }
        if let Some(index) = out.iter().position(|a| a.iter().any(|c| !c.is_finite())) {
            error!(index, "non-finite acceleration");
            return Err(SimError::NonFinite { index });
        }
        Ok(())
    }
}

impl<const D: usize> Default for AccelSet<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Acceleration source operating on a [`System`].
/// Implementations add their contribution into `out[i]` for each body
pub trait Acceleration<const D: usize> {
    fn acceleration(&self, t: f64, sys: &System<D>, out: &mut [NVec<D>]) -> SimResult<()>;
}

/// Direct O(N^2) Newtonian gravity, unsoftened.
/// Pairs closer than `sqrt(min_separation2)` abort the step
#[derive(Debug, Clone, Copy)]
pub struct NewtonianGravity {
    pub min_separation2: f64,
}

impl<const D: usize> Acceleration<D> for NewtonianGravity {
    fn acceleration(&self, _t: f64, sys: &System<D>, out: &mut [NVec<D>]) -> SimResult<()> {
        let n = sys.bodies.len();

        // Each unordered pair once; the two contributions share one
        // displacement so the pair force stays exactly antisymmetric
        for i in 0..n {
            let bi = &sys.bodies[i];
            for j in (i + 1)..n {
                let bj = &sys.bodies[j];

                // r points from i to j: i is pulled along +r, j along -r
                let r = bj.x - bi.x;
                let r2 = r.norm_squared();
                check_separation(i, j, r2, self.min_separation2)?;

                // 1 / |r|^3
                let inv_r3 = 1.0 / (r2 * r2.sqrt());

                out[i] += r * (bj.gm * inv_r3);
                out[j] -= r * (bi.gm * inv_r3);
            }
        }
        Ok(())
    }
}

/// Acceleration on body `i` alone from every other body `j != i`,
/// each term being `gm_j / r^2` along the unit vector toward `j`
pub fn acceleration_on<const D: usize>(
    sys: &System<D>,
    i: usize,
    min_separation2: f64,
) -> SimResult<NVec<D>> {
    let xi = sys.bodies[i].x;
    let mut a = NVec::<D>::zeros();

    for (j, bj) in sys.bodies.iter().enumerate() {
        if j == i {
            continue;
        }
        let r = bj.x - xi;
        let r2 = r.norm_squared();
        check_separation(i, j, r2, min_separation2)?;
        a += r * (bj.gm / (r2 * r2.sqrt()));
    }

    Ok(a)
}

fn check_separation(i: usize, j: usize, r2: f64, min_separation2: f64) -> SimResult<()> {
    // `!(a >= b)` also catches a NaN r2
    if !(r2 >= min_separation2) || r2 == 0.0 {
        error!(i, j, r2, "bodies coincide, aborting run");
        return Err(SimError::Singular { i, j, r2 });
    }
    Ok(())
}
