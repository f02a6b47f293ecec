//! Duty-cycle gate derivation for CV/gate B: a square gate whose full cycle is a selectable
//! musical division of the bar, independent of the pattern sequencer on gate A.

use crate::control::ControlSelect;
use crate::gate::Gate;
use embassy_time::Instant;
use num_derive::{FromPrimitive, ToPrimitive};

/// The fixed division catalog, ordered from shortest to longest cycle.
///
/// Declaration order is the pot sweep order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Division {
    /// 6 ticks per cycle.
    Sixteenth,
    /// 12 ticks per cycle.
    Eighth,
    /// 24 ticks per cycle, one quarter note.
    Quarter,
    /// 48 ticks per cycle.
    Half,
    /// 96 ticks per cycle, one bar of 4/4.
    Whole,
}

impl Division {
    /// Length of one full gate cycle in clock ticks, at 24 PPQN.
    pub fn cycle_ticks(self) -> u32 {
        match self {
            Self::Sixteenth => 6,
            Self::Eighth => 12,
            Self::Quarter => 24,
            Self::Half => 48,
            Self::Whole => 96,
        }
    }

    /// Human-readable note value, for the display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Sixteenth => "1/16",
            Self::Eighth => "1/8",
            Self::Quarter => "1/4",
            Self::Half => "1/2",
            Self::Whole => "1/1",
        }
    }
}

impl ControlSelect for Division {
    const COUNT: u8 = 5;
}

/// Produces the 50 %-duty gate on CV/gate B.
///
/// The level is a pure function of the tick counter and the current division, so nothing here
/// stores a phase. Changing the division mid-cycle therefore re-phases on the very next
/// evaluation and can produce one audibly short or long step. That matches the original
/// hardware's behavior; smoothing the switchover would need re-validation against it.
pub struct DivisionGate {
    selection: Division,
    gate: Gate,
}

impl Default for DivisionGate {
    fn default() -> Self {
        Self {
            selection: Division::Quarter,
            gate: Gate::default(),
        }
    }
}

impl DivisionGate {
    /// Reselects the division from a fresh control sample. Returns whether the selection moved.
    pub fn select(&mut self, value: u16) -> bool {
        let next = Division::from_control(value);
        if next == self.selection {
            return false;
        }
        self.selection = next;
        true
    }

    /// The currently selected division.
    pub fn selection(&self) -> Division {
        self.selection
    }

    /// Re-derives the level for one emitted clock tick: high for the first half of the cycle,
    /// low for the second. Returns whether the level changed.
    pub fn on_tick(&mut self, tick: u32, now: Instant) -> bool {
        let cycle = self.selection.cycle_ticks();
        let high = tick % cycle < cycle / 2;
        if high == self.gate.is_high() {
            return false;
        }
        if high {
            self.gate.raise(now);
        } else {
            self.gate.clear();
        }
        true
    }

    /// Transport-stop path: forces the gate low immediately.
    pub fn reset(&mut self) -> bool {
        let was_high = self.gate.is_high();
        self.gate.clear();
        was_high
    }

    /// The current gate-B level.
    pub fn is_high(&self) -> bool {
        self.gate.is_high()
    }
}
