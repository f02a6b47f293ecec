//! Tempo management: beats per minute and the two intervals derived from it, the MIDI clock
//! period and the gate pulse width. Both are cached and recomputed only when an adjustment
//! actually changes the BPM, so the hot path of the control loop never divides.

use embassy_time::Duration;

/// MIDI beat-clock resolution, in pulses per quarter note.
pub const PPQN: u32 = 24;

/// Lowest selectable tempo.
pub const BPM_MIN: u16 = 40;

/// Highest selectable tempo.
pub const BPM_MAX: u16 = 240;

const BPM_DEFAULT: u16 = 120;

const MICROS_PER_MINUTE: u64 = 60_000_000;

/// Owns the current tempo and everything derived from it.
///
/// `BPM_MIN` being well above zero is what makes the derived intervals structurally non-zero;
/// there is no division-by-zero check anywhere downstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tempo {
    bpm: u16,
    tick_interval_us: u64,
    gate_length_us: u64,
}

impl Default for Tempo {
    fn default() -> Self {
        let mut tempo = Self {
            bpm: BPM_DEFAULT,
            tick_interval_us: 0,
            gate_length_us: 0,
        };
        tempo.recompute();
        tempo
    }
}

impl Tempo {
    /// Applies a signed encoder delta to the BPM, clamping the result to
    /// [`BPM_MIN`]..=[`BPM_MAX`]. Returns whether the BPM actually changed; deltas that land
    /// on an already-saturated boundary are silently absorbed.
    pub fn adjust(&mut self, delta: i16) -> bool {
        let target = i32::from(self.bpm)
            .saturating_add(i32::from(delta))
            .clamp(i32::from(BPM_MIN), i32::from(BPM_MAX)) as u16;
        if target == self.bpm {
            return false;
        }
        self.bpm = target;
        self.recompute();
        true
    }

    /// The current tempo in beats per minute.
    pub fn bpm(&self) -> u16 {
        self.bpm
    }

    /// The period of one MIDI clock pulse: one minute divided by `bpm * PPQN` pulses,
    /// truncated to whole microseconds.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_micros(self.tick_interval_us)
    }

    /// How long a sequenced gate pulse stays high: a sixteenth note at the current tempo.
    ///
    /// The pulse width is a physical duration rather than a tick count so that pulses stay
    /// audibly consistent as the step grid shrinks at higher tempos.
    pub fn gate_length(&self) -> Duration {
        Duration::from_micros(self.gate_length_us)
    }

    fn recompute(&mut self) {
        let bpm = u64::from(self.bpm);
        self.tick_interval_us = MICROS_PER_MINUTE / (bpm * u64::from(PPQN));
        self.gate_length_us = MICROS_PER_MINUTE / (bpm * 4);
    }
}
