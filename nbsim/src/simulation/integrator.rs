//! Fixed-step time integrators for the N-body system
//!
//! Both integrators read every acceleration from the pre-step configuration
//! before any body moves, so no body ever sees another body's
//! already-advanced state within the same step.

use tracing::error;

use super::forces::AccelSet;
use super::params::Parameters;
use super::states::{Body, NVec, System};
use crate::configuration::config::IntegratorConfig;
use crate::error::{SimError, SimResult};

/// Advance `sys` by one inner step with the selected integrator
pub fn step<const D: usize>(
    kind: IntegratorConfig,
    sys: &mut System<D>,
    forces: &AccelSet<D>,
    params: &Parameters,
) -> SimResult<()> {
    match kind {
        IntegratorConfig::Kinematic => kinematic_integrator(sys, forces, params),
        IntegratorConfig::Verlet => verlet_integrator(sys, forces, params),
    }
}

/// Advance the system by one step with the constant-acceleration update
///
/// v_n+1 = v_n + a_n dt
/// x_n+1 = x_n + v_n dt + a_n dt^2 / 2
///
/// `a_n` is the attractive acceleration (pointing toward the other bodies).
/// On error the system is left exactly as it was before the call
pub fn kinematic_integrator<const D: usize>(
    sys: &mut System<D>,
    forces: &AccelSet<D>,
    params: &Parameters,
) -> SimResult<()> {
    let n = sys.bodies.len();
    if n == 0 {
        return Ok(());
    }

    let dt = params.h0;
    let half_dt2 = 0.5 * dt * dt;

    // a_n for every body, from the untouched configuration at t_n
    let mut a_old = vec![NVec::<D>::zeros(); n];
    forces.accumulate_accels(sys.t, &*sys, &mut a_old)?;

    // Each body's update only needs its own old velocity and a_n
    let mut next = sys.bodies.clone();
    for (b, a) in next.iter_mut().zip(a_old.iter()) {
        let v_old = b.v;
        b.v = v_old + *a * dt;
        b.x += v_old * dt + *a * half_dt2;
    }
    ensure_finite(&next)?;

    sys.bodies = next;
    sys.t += dt;
    Ok(())
}

/// Advance the system by one step using velocity-Verlet (kick, drift, kick).
/// Uses two force evaluations per step
pub fn verlet_integrator<const D: usize>(
    sys: &mut System<D>,
    forces: &AccelSet<D>,
    params: &Parameters,
) -> SimResult<()> {
    let n = sys.bodies.len();
    if n == 0 {
        return Ok(());
    }

    let dt = params.h0;
    let half_dt = 0.5 * dt;

    let mut a_old = vec![NVec::<D>::zeros(); n];
    forces.accumulate_accels(sys.t, &*sys, &mut a_old)?;

    // Kick + drift on a working copy
    // v_n+1/2 = v_n + (dt/2) a_n
    // x_n+1 = x_n + dt v_n+1/2
    let mut next = System {
        bodies: sys.bodies.clone(),
        t: sys.t + dt,
    };
    for (b, a) in next.bodies.iter_mut().zip(a_old.iter()) {
        b.v += *a * half_dt;
        b.x += b.v * dt;
    }

    // a_n+1 from x_n+1
    let mut a_new = vec![NVec::<D>::zeros(); n];
    forces.accumulate_accels(next.t, &next, &mut a_new)?;

    // v_n+1 = v_n+1/2 + (dt/2) a_n+1
    for (b, a) in next.bodies.iter_mut().zip(a_new.iter()) {
        b.v += *a * half_dt;
    }
    ensure_finite(&next.bodies)?;

    *sys = next;
    Ok(())
}

fn ensure_finite<const D: usize>(bodies: &[Body<D>]) -> SimResult<()> {
    let bad = bodies
        .iter()
        .position(|b| b.x.iter().chain(b.v.iter()).any(|c| !c.is_finite()));
    match bad {
        Some(index) => {
            error!(index, "non-finite position or velocity after step");
            Err(SimError::NonFinite { index })
        }
        None => Ok(()),
    }
}
