//! The visual metronome: maps the tick counter onto a three-position bounce for the display.

use crate::tempo::PPQN;

/// Where the bouncing beat indicator sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MetronomePosition {
    /// Leftmost position, occupied on the downbeat.
    Left,
    /// The rest position, occupied twice per quarter note.
    Center,
    /// Rightmost position, occupied on the upbeat.
    Right,
}

/// Clock ticks per display phase: the quarter note is divided into four phases.
const TICKS_PER_PHASE: u32 = PPQN / 4;

/// Display position per phase index. The indicator rests at `Center` twice per quarter note
/// (phases 1 and 3), giving the bounce its deliberate left-center-right-center asymmetry.
/// Kept as a table so the shape is data, not branching.
const PHASE_TABLE: [MetronomePosition; 4] = [
    MetronomePosition::Left,
    MetronomePosition::Center,
    MetronomePosition::Right,
    MetronomePosition::Center,
];

/// Tracks the indicator position from the tick counter.
pub struct Metronome {
    position: MetronomePosition,
}

impl Default for Metronome {
    fn default() -> Self {
        Self {
            position: MetronomePosition::Center,
        }
    }
}

impl Metronome {
    /// Re-derives the position for one emitted clock tick. Returns whether it moved.
    pub fn on_tick(&mut self, tick: u32) -> bool {
        let phase = (tick % PPQN) / TICKS_PER_PHASE;
        let position = PHASE_TABLE[phase as usize];
        if position == self.position {
            return false;
        }
        self.position = position;
        true
    }

    /// Transport-stop path: parks the indicator at its rest position. Returns whether it moved.
    pub fn reset(&mut self) -> bool {
        if self.position == MetronomePosition::Center {
            return false;
        }
        self.position = MetronomePosition::Center;
        true
    }

    /// The current indicator position.
    pub fn position(&self) -> MetronomePosition {
        self.position
    }
}
