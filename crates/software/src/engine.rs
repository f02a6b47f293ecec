//! The per-pass composition of all components: one call to [`Engine::update`] is one pass of
//! the cooperative control loop. The fixed internal order is tempo, selections, transport,
//! pending ticks (each fully processed by every tick-driven component before the next), then
//! the timed gate release. Nothing in here blocks, and the current time is an explicit input
//! sampled once by the caller.

use crate::division::{Division, DivisionGate};
use crate::metronome::{Metronome, MetronomePosition};
use crate::pattern::{PatternGate, PatternSelect};
use crate::tempo::Tempo;
use crate::transport::Transport;
use embassy_time::Instant;
use tinyvec::ArrayVec;

/// Upper bound on clock ticks emitted by a single pass. A pass delayed longer than this does
/// not lose the remainder: the transport timebase carries the debt, so the leftover ticks are
/// emitted on the following passes and the beat count stays exact.
pub const MAX_TICKS_PER_PASS: usize = 32;

/// Room for one transport message plus a full pass worth of ticks.
const PASS_CAPACITY: usize = MAX_TICKS_PER_PASS + 1;

/// MIDI real-time messages produced by a pass, in the exact order they must hit the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockMessage {
    /// One beat-clock pulse (0xF8).
    #[default]
    Clock,
    /// Transport started (0xFA); always precedes the first `Clock` of a run.
    Start,
    /// Transport stopped (0xFC); no `Clock` follows until the next `Start`.
    Stop,
}

impl ClockMessage {
    /// The wire-level representation, per the MIDI 1.0 real-time message set.
    pub fn message(self) -> wmidi::MidiMessage<'static> {
        match self {
            Self::Clock => wmidi::MidiMessage::TimingClock,
            Self::Start => wmidi::MidiMessage::Start,
            Self::Stop => wmidi::MidiMessage::Stop,
        }
    }
}

/// The ordered batch of messages one pass produced.
pub type ClockBatch = ArrayVec<[ClockMessage; PASS_CAPACITY]>;

/// Inputs gathered by the I/O layer since the previous pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlEvents {
    /// Summed encoder movement, in BPM.
    pub tempo_delta: i16,
    /// Whether the (debounced) transport button was released since the previous pass.
    pub transport_toggle: bool,
    /// Fresh pattern pot sample, present only when the pot resample interval elapsed.
    pub pattern_control: Option<u16>,
    /// Fresh division pot sample, present only when the pot resample interval elapsed.
    pub division_control: Option<u16>,
}

/// The whole instrument, minus I/O.
///
/// Ownership mirrors the signal flow: the engine owns one of each component, each component
/// exclusively owns its piece of state, and the tick counter flows outward by value.
pub struct Engine {
    tempo: Tempo,
    transport: Transport,
    pattern_gate: PatternGate,
    division_gate: DivisionGate,
    metronome: Metronome,
    changed: bool,
}

impl Engine {
    /// Constructs the engine in its power-on state: stopped, 120 BPM, all-active pattern,
    /// quarter-note division. The seed feeds the random pattern mode.
    pub fn new(seed: u64) -> Self {
        Self {
            tempo: Tempo::default(),
            transport: Transport::default(),
            pattern_gate: PatternGate::new(seed),
            division_gate: DivisionGate::default(),
            metronome: Metronome::default(),
            changed: true,
        }
    }

    /// Runs one control pass at time `now` and returns the MIDI real-time messages to send,
    /// already in wire order.
    pub fn update(&mut self, now: Instant, events: &ControlEvents) -> ClockBatch {
        let mut batch = ClockBatch::new();

        if events.tempo_delta != 0 {
            self.tempo.adjust(events.tempo_delta);
            // a delta absorbed by the clamp still repaints the display, matching the
            // original firmware's behavior at the range boundaries
            self.changed = true;
        }

        if let Some(sample) = events.pattern_control {
            self.changed |= self.pattern_gate.select(sample);
        }
        if let Some(sample) = events.division_control {
            self.changed |= self.division_gate.select(sample);
        }

        if events.transport_toggle {
            if self.transport.is_running() {
                self.transport.stop();
                // silence everything within this same pass, even mid-pulse
                self.pattern_gate.reset();
                self.division_gate.reset();
                self.metronome.reset();
                batch.push(ClockMessage::Stop);
            } else {
                self.transport.start(now);
                batch.push(ClockMessage::Start);
            }
            self.changed = true;
        }

        let interval = self.tempo.tick_interval();
        for _ in 0..MAX_TICKS_PER_PASS {
            let Some(tick) = self.transport.try_tick(now, interval) else {
                break;
            };
            batch.push(ClockMessage::Clock);
            self.changed |= self.pattern_gate.on_tick(tick, now);
            self.changed |= self.division_gate.on_tick(tick, now);
            self.changed |= self.metronome.on_tick(tick);
        }

        // timed release runs every pass, independent of the step grid
        self.changed |= self.pattern_gate.expire(now, self.tempo.gate_length());

        batch
    }

    /// The current gate-A (pattern) level.
    pub fn gate_a(&self) -> bool {
        self.pattern_gate.is_high()
    }

    /// The current gate-B (division) level.
    pub fn gate_b(&self) -> bool {
        self.division_gate.is_high()
    }

    /// The current tempo in beats per minute.
    pub fn bpm(&self) -> u16 {
        self.tempo.bpm()
    }

    /// Whether the transport is rolling.
    pub fn is_running(&self) -> bool {
        self.transport.is_running()
    }

    /// Ticks emitted since the transport last started.
    pub fn tick_count(&self) -> u32 {
        self.transport.tick_count()
    }

    /// The current metronome indicator position.
    pub fn metronome_position(&self) -> MetronomePosition {
        self.metronome.position()
    }

    /// The currently selected pattern.
    pub fn pattern(&self) -> PatternSelect {
        self.pattern_gate.selection()
    }

    /// The currently selected division.
    pub fn division(&self) -> Division {
        self.division_gate.selection()
    }

    /// Whether any observable state changed since the last call; reading clears the flag.
    /// The display collaborator polls this to know when to redraw.
    pub fn take_changed(&mut self) -> bool {
        core::mem::take(&mut self.changed)
    }
}
