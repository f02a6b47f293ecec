//! The drift-corrected transport clock. It owns the play/stop state and the tick counter and
//! is the sole writer of both; every tick-driven component downstream reads the counter and
//! never mutates it.

use embassy_time::{Duration, Instant};

/// Whether the transport is rolling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportState {
    /// The clock is silent; no pulses are produced and the tick counter is parked at zero.
    Stopped,
    /// Pulses are produced every tick interval.
    Running,
}

/// Generates clock ticks by polling elapsed time against the tick interval.
///
/// The timebase advances by exactly one nominal interval per emitted tick rather than being
/// resynchronized to the sampled clock. The fractional remainder of the current poll therefore
/// never accumulates across ticks; total drift stays bounded by one polling granularity no
/// matter how long the transport runs.
#[derive(Clone, Copy, Debug)]
pub struct Transport {
    state: TransportState,
    tick_count: u32,
    timebase: Instant,
}

impl Default for Transport {
    fn default() -> Self {
        Self {
            state: TransportState::Stopped,
            tick_count: 0,
            timebase: Instant::from_micros(0),
        }
    }
}

impl Transport {
    /// Starts the transport: zeroes the tick counter and anchors the timebase at `now`.
    /// A no-op when already running.
    pub fn start(&mut self, now: Instant) {
        if self.state == TransportState::Running {
            return;
        }
        self.state = TransportState::Running;
        self.tick_count = 0;
        self.timebase = now;
    }

    /// Stops the transport and zeroes the tick counter. A no-op when already stopped.
    pub fn stop(&mut self) {
        if self.state == TransportState::Stopped {
            return;
        }
        self.state = TransportState::Stopped;
        self.tick_count = 0;
    }

    /// Emits at most one tick: if running and a full `interval` has elapsed since the
    /// timebase, advances the timebase by exactly `interval` and returns the index of the
    /// emitted tick. The caller loops until `None` so a delayed pass emits every pending
    /// tick individually and none is ever skipped.
    ///
    /// A tempo change takes effect from the next call onward; already-emitted ticks are
    /// never retroactively corrected.
    pub fn try_tick(&mut self, now: Instant, interval: Duration) -> Option<u32> {
        if self.state != TransportState::Running {
            return None;
        }
        if now.saturating_duration_since(self.timebase) < interval {
            return None;
        }
        self.timebase += interval;
        let index = self.tick_count;
        self.tick_count = self.tick_count.wrapping_add(1);
        Some(index)
    }

    /// Ticks emitted since the transport last started.
    pub fn tick_count(&self) -> u32 {
        self.tick_count
    }

    /// Whether the transport is rolling.
    pub fn is_running(&self) -> bool {
        self.state == TransportState::Running
    }
}
