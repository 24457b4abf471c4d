//! Snapshots handed to the external renderer
//!
//! A snapshot is an owned copy of every body's position and tag taken after
//! a tick. The renderer only ever sees these, never the live system.

use std::time::Duration;

use crossbeam_channel::{SendTimeoutError, Sender};

use super::states::{NVec, System};

#[derive(Debug, Clone, PartialEq)]
pub struct BodyView<const D: usize> {
    pub x: NVec<D>,
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<const D: usize> {
    pub tick: u64, // 1-based tick / sample index
    pub t: f64, // simulated time
    pub bodies: Vec<BodyView<D>>,
}

impl<const D: usize> Snapshot<D> {
    pub fn capture(tick: u64, sys: &System<D>) -> Self {
        Self {
            tick,
            t: sys.t,
            bodies: sys
                .bodies
                .iter()
                .map(|b| BodyView {
                    x: b.x,
                    tag: b.tag.clone(),
                })
                .collect(),
        }
    }
}

/// What became of a snapshot offered to a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    Delivered,
    /// Given up because the run was cancelled while the sink was blocked
    Abandoned,
    /// The consumer is gone
    Disconnected,
}

/// Consumer of snapshots. Returning `false` means the consumer is gone;
/// continuous runs stop on it, bulk runs keep going.
///
/// Continuous runs go through `emit_unless`. A sink that can block must
/// override it and keep polling `stop`, otherwise cancelling the run waits
/// for the block to clear
pub trait SnapshotSink<const D: usize> {
    fn emit(&mut self, snapshot: Snapshot<D>) -> bool;

    fn emit_unless(&mut self, snapshot: Snapshot<D>, stop: &dyn Fn() -> bool) -> Emission {
        if stop() {
            Emission::Abandoned
        } else if self.emit(snapshot) {
            Emission::Delivered
        } else {
            Emission::Disconnected
        }
    }
}

/// How often a blocked channel send looks at the stop condition
const SEND_POLL: Duration = Duration::from_millis(1);

impl<const D: usize> SnapshotSink<D> for Vec<Snapshot<D>> {
    fn emit(&mut self, snapshot: Snapshot<D>) -> bool {
        self.push(snapshot);
        true
    }
}

impl<const D: usize> SnapshotSink<D> for Sender<Snapshot<D>> {
    fn emit(&mut self, snapshot: Snapshot<D>) -> bool {
        self.send(snapshot).is_ok()
    }

    // a full bounded channel must not pin the run past its cancellation
    fn emit_unless(&mut self, mut snapshot: Snapshot<D>, stop: &dyn Fn() -> bool) -> Emission {
        loop {
            if stop() {
                return Emission::Abandoned;
            }
            match self.send_timeout(snapshot, SEND_POLL) {
                Ok(()) => return Emission::Delivered,
                Err(SendTimeoutError::Disconnected(_)) => return Emission::Disconnected,
                Err(SendTimeoutError::Timeout(back)) => snapshot = back,
            }
        }
    }
}

/// Adapter so a plain closure can consume snapshots
pub struct FnSink<F>(pub F);

impl<const D: usize, F> SnapshotSink<D> for FnSink<F>
where
    F: FnMut(&Snapshot<D>),
{
    fn emit(&mut self, snapshot: Snapshot<D>) -> bool {
        (self.0)(&snapshot);
        true
    }
}

/// Discards everything; handy when only the final state matters
pub struct NullSink;

impl<const D: usize> SnapshotSink<D> for NullSink {
    fn emit(&mut self, _snapshot: Snapshot<D>) -> bool {
        true
    }
}
