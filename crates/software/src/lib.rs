//! This crate contains the architecture-agnostic core of Taktgeber, a standalone MIDI beat-clock
//! generator. The device produces a drift-corrected [MIDI real-time clock](https://midi.org/midi-1-0)
//! at a performer-controlled tempo and derives two independent [CV/gate](https://en.wikipedia.org/wiki/CV/gate)
//! outputs from it: gate A is a step sequencer driven by a selectable rhythmic pattern, gate B is a
//! duty-cycle gate keyed to a selectable musical division.
//!
//! Nothing in this crate touches hardware or consults a wall clock. Every component takes the
//! current [`Instant`][embassy_time::Instant] as an explicit input, which keeps the whole engine
//! runnable (and testable) under simulated time on the host. The firmware crate owns the
//! peripherals and drives [`Engine::update`][engine::Engine::update] once per cooperative pass.

#![deny(missing_docs)]
#![no_std]

/// Analog control mapping onto catalog selections.
pub mod control;

/// Duty-cycle gate derivation for CV/gate B.
pub mod division;

/// The per-pass composition of all components.
pub mod engine;

/// The shared gate-output primitive.
pub mod gate;

/// The visual metronome phase tracker.
pub mod metronome;

/// Step-sequenced gate derivation for CV/gate A.
pub mod pattern;

/// Tempo and the timing values derived from it.
pub mod tempo;

/// The drift-corrected transport clock.
pub mod transport;
