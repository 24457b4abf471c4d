//! Step scheduling: how many inner steps run between snapshots, and who
//! drives them.
//!
//! - bulk mode runs `samples` ticks back to back on the caller's thread and
//!   returns once `t_end` is covered, spreading the steps over the ticks;
//! - continuous mode moves the scenario onto a worker thread that fires on a
//!   fixed cadence until it is cancelled.
//!
//! In both modes a tick is a batch of inner steps followed by one snapshot.
//! Inner steps are never interrupted; cancellation is only looked at
//! between ticks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, Receiver, Sender};
use tracing::{debug, error, info, warn};

use super::integrator;
use super::params::Parameters;
use super::scenario::Scenario;
use super::snapshot::{Emission, Snapshot, SnapshotSink};
use super::states::System;
use crate::configuration::config::ModeConfig;
use crate::error::{SimError, SimResult};

/// Inner steps per tick and the wall-clock spacing between continuous ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cadence {
    pub interval: Duration,
    pub steps_per_tick: u64,
}

impl Cadence {
    pub const MAX_STEPS_PER_TICK: u64 = 10_000_000;
    pub const MAX_INTERVAL: Duration = Duration::from_secs(60);

    /// Continuous mode: advance `speed` simulated seconds per wall second.
    /// A single step would need `h0 / speed` of wall time; when that is
    /// below the floor the tick batches enough steps to reach it.
    ///
    /// Extreme speeds are clamped to `MAX_STEPS_PER_TICK` and
    /// `MAX_INTERVAL` with a warning; the run then drifts off the requested
    /// speed instead of failing
    pub fn continuous(params: &Parameters) -> Self {
        let step_wall = params.h0 / params.speed;
        let floor = params.min_interval.as_secs_f64();

        let mut steps_per_tick = if step_wall >= floor {
            1
        } else {
            ceil_steps(floor / step_wall)
        };
        if steps_per_tick > Self::MAX_STEPS_PER_TICK {
            warn!(
                steps_per_tick,
                max = Self::MAX_STEPS_PER_TICK,
                speed = params.speed,
                "speed too high for the step size, capping the batch"
            );
            steps_per_tick = Self::MAX_STEPS_PER_TICK;
        }

        let wanted = (steps_per_tick as f64 * step_wall).max(floor);
        let interval = match Duration::try_from_secs_f64(wanted) {
            Ok(interval) if interval <= Self::MAX_INTERVAL => interval,
            _ => {
                warn!(
                    interval_s = wanted,
                    max_s = Self::MAX_INTERVAL.as_secs_f64(),
                    speed = params.speed,
                    "tick interval too long, capping"
                );
                Self::MAX_INTERVAL
            }
        };

        Self {
            interval,
            steps_per_tick,
        }
    }
}

/// How a bulk run's inner steps are shared out over its samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkPlan {
    pub samples: u64,
    pub total_steps: u64, // t_end / h0, rounded up
}

impl BulkPlan {
    pub fn new(params: &Parameters) -> Self {
        Self {
            samples: u64::from(params.samples.max(1)),
            total_steps: ceil_steps(params.t_end / params.h0),
        }
    }

    /// Steps run before sample `tick` (1-based). Batch sizes differ by at
    /// most one; when there are more samples than steps some batches are
    /// empty and the snapshot repeats the previous state
    pub fn steps_for(&self, tick: u64) -> u64 {
        self.steps_through(tick) - self.steps_through(tick - 1)
    }

    /// Largest batch any sample gets
    pub fn max_batch(&self) -> u64 {
        self.total_steps.div_ceil(self.samples)
    }

    fn steps_through(&self, tick: u64) -> u64 {
        (u128::from(self.total_steps) * u128::from(tick) / u128::from(self.samples)) as u64
    }
}

/// `ceil`, except that ratios within rounding noise of an integer stay on it.
/// Never below 1; saturates at `u64::MAX`
fn ceil_steps(ratio: f64) -> u64 {
    let nearest = ratio.round();
    let steps = if (ratio - nearest).abs() <= 1e-9 * ratio.max(1.0) {
        nearest
    } else {
        ratio.ceil()
    };
    steps.max(1.0) as u64
}

/// Summary of a finished bulk run
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunReport {
    pub ticks: u64,
    pub inner_steps: u64,
    pub t: f64, // simulated time at the end of the run
}

/// Run one tick: `steps` inner steps on the scenario's own system
fn advance<const D: usize>(scenario: &mut Scenario<D>, steps: u64) -> SimResult<()> {
    let Scenario {
        engine,
        parameters,
        system,
        forces,
    } = scenario;

    for _ in 0..steps {
        integrator::step(engine.integrator, system, forces, parameters)?;
    }
    Ok(())
}

/// Run to completion on the calling thread, emitting one snapshot per sample
pub fn run_bulk<const D: usize, S>(scenario: &mut Scenario<D>, sink: &mut S) -> SimResult<RunReport>
where
    S: SnapshotSink<D> + ?Sized,
{
    let plan = BulkPlan::new(&scenario.parameters);
    info!(
        samples = plan.samples,
        total_steps = plan.total_steps,
        max_batch = plan.max_batch(),
        h0 = scenario.parameters.h0,
        t_end = scenario.parameters.t_end,
        "bulk run started"
    );
    let energy0 = scenario.system.energy();

    let mut report = RunReport::default();
    for tick in 1..=plan.samples {
        let steps = plan.steps_for(tick);
        advance(scenario, steps)?;
        report.inner_steps += steps;
        report.ticks = tick;
        sink.emit(Snapshot::capture(tick, &scenario.system));
    }
    report.t = scenario.system.t;

    debug!(
        energy0,
        energy = scenario.system.energy(),
        momentum = ?scenario.system.momentum(),
        "bulk run diagnostics (G-scaled)"
    );
    info!(ticks = report.ticks, inner_steps = report.inner_steps, t = report.t, "bulk run finished");
    Ok(report)
}

/// Handle to a continuous run on its worker thread.
///
/// Dropping the handle cancels the run and waits for the worker
pub struct ContinuousHandle<const D: usize> {
    gate: Arc<Mutex<()>>,
    cancelled: Arc<AtomicBool>,
    cancel_tx: Sender<()>,
    worker: Option<JoinHandle<SimResult<System<D>>>>,
}

impl<const D: usize> ContinuousHandle<D> {
    /// Request cancellation. Once this returns no further snapshot is
    /// emitted; an emission already under way either completes or is
    /// abandoned first. A tick that is mid-batch still finishes its inner
    /// steps
    pub fn cancel(&self) {
        // flag first: a sink blocked inside the gate polls it and lets go
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            info!("continuous run cancelled");
        }
        let _ = self.cancel_tx.try_send(());
        // taking the gate orders us after any emission in flight
        let _guard = self.gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// The worker has stopped (cancelled, failed, or its consumer went away)
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, |w| w.is_finished())
    }

    /// Cancel and wait for the worker; yields the final system state or the
    /// error that aborted the run
    pub fn join(mut self) -> SimResult<System<D>> {
        self.cancel();
        self.wait()
    }

    fn wait(&mut self) -> SimResult<System<D>> {
        match self.worker.take() {
            Some(worker) => worker.join().map_err(|_| SimError::WorkerPanicked)?,
            None => Err(SimError::WorkerPanicked),
        }
    }
}

impl<const D: usize> Drop for ContinuousHandle<D> {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.cancel();
            let _ = self.wait();
        }
    }
}

/// Move `scenario` onto a worker thread and tick it until cancelled
pub fn run_continuous<const D: usize, S>(scenario: Scenario<D>, sink: S) -> ContinuousHandle<D>
where
    S: SnapshotSink<D> + Send + 'static,
{
    let cadence = Cadence::continuous(&scenario.parameters);
    debug!(
        interval_ms = cadence.interval.as_secs_f64() * 1000.0,
        steps_per_tick = cadence.steps_per_tick,
        "continuous cadence"
    );

    let gate = Arc::new(Mutex::new(()));
    let cancelled = Arc::new(AtomicBool::new(false));
    let (cancel_tx, cancel_rx) = bounded(1);

    let worker = {
        let gate = Arc::clone(&gate);
        let cancelled = Arc::clone(&cancelled);
        thread::spawn(move || continuous_worker(scenario, sink, cadence, gate, cancelled, cancel_rx))
    };

    info!(steps_per_tick = cadence.steps_per_tick, "continuous run started");
    ContinuousHandle {
        gate,
        cancelled,
        cancel_tx,
        worker: Some(worker),
    }
}

fn continuous_worker<const D: usize, S: SnapshotSink<D>>(
    mut scenario: Scenario<D>,
    mut sink: S,
    cadence: Cadence,
    gate: Arc<Mutex<()>>,
    cancelled: Arc<AtomicBool>,
    cancel_rx: Receiver<()>,
) -> SimResult<System<D>> {
    let ticker = tick(cadence.interval);
    let mut ticks = 0u64;

    loop {
        select! {
            recv(cancel_rx) -> _ => break,
            recv(ticker) -> _ => {}
        }
        // select! picks randomly among ready arms; the flag is authoritative
        if cancelled.load(Ordering::SeqCst) {
            break;
        }

        if let Err(err) = advance(&mut scenario, cadence.steps_per_tick) {
            error!(%err, ticks, "continuous run aborted");
            return Err(err);
        }

        let snapshot = Snapshot::capture(ticks + 1, &scenario.system);
        let _guard = gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if cancelled.load(Ordering::SeqCst) {
            // cancelled mid-batch: keep the advanced state, drop the snapshot
            break;
        }
        match sink.emit_unless(snapshot, &|| cancelled.load(Ordering::SeqCst)) {
            Emission::Delivered => ticks += 1,
            Emission::Abandoned => break,
            Emission::Disconnected => {
                info!(ticks, "snapshot consumer gone, stopping");
                break;
            }
        }
    }

    debug!(ticks, t = scenario.system.t, "continuous worker exiting");
    Ok(scenario.system)
}

/// Whether a run is active, and of which kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running(ModeConfig),
}

/// Owner of at most one active run per body store dimension.
/// Starting any run first cancels and awaits the previous one
pub struct Simulator<const D: usize> {
    state: RunState,
    active: Option<ContinuousHandle<D>>,
    replaced: Option<SimResult<System<D>>>,
}

impl<const D: usize> Simulator<D> {
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
            active: None,
            replaced: None,
        }
    }

    pub fn state(&self) -> RunState {
        match (&self.active, self.state) {
            (Some(handle), RunState::Running(_)) if handle.is_finished() => RunState::Idle,
            (_, state) => state,
        }
    }

    /// Start a continuous run, returning the outcome of the run it replaced
    pub fn start_continuous<S>(&mut self, scenario: Scenario<D>, sink: S) -> Option<SimResult<System<D>>>
    where
        S: SnapshotSink<D> + Send + 'static,
    {
        let previous = self.cancel();
        self.active = Some(run_continuous(scenario, sink));
        self.state = RunState::Running(ModeConfig::Continuous);
        previous
    }

    /// Run `scenario` in bulk mode after stopping any continuous run. The
    /// stopped run's outcome is kept for `take_replaced`
    pub fn run_bulk<S>(&mut self, scenario: &mut Scenario<D>, sink: &mut S) -> SimResult<RunReport>
    where
        S: SnapshotSink<D> + ?Sized,
    {
        if let Some(previous) = self.cancel() {
            if let Err(err) = &previous {
                warn!(%err, "replaced continuous run had failed");
            }
            self.replaced = Some(previous);
        }
        self.state = RunState::Running(ModeConfig::Bulk);
        let result = run_bulk(scenario, sink);
        self.state = RunState::Idle;
        result
    }

    /// Outcome of the continuous run the last bulk run replaced
    pub fn take_replaced(&mut self) -> Option<SimResult<System<D>>> {
        self.replaced.take()
    }

    /// Cancel and await the active continuous run, if any
    pub fn cancel(&mut self) -> Option<SimResult<System<D>>> {
        self.state = RunState::Idle;
        self.active.take().map(ContinuousHandle::join)
    }
}

impl<const D: usize> Default for Simulator<D> {
    fn default() -> Self {
        Self::new()
    }
}
