//! Step-sequenced gate derivation for CV/gate A.
//!
//! Patterns advance on eighth-note steps. Pulse onset is quantized to the step grid (edge
//! detection on the step index), while pulse width is a tempo-derived physical duration handled
//! by the shared [`Gate`] primitive; the two halves are deliberately decoupled so the pulse
//! width stays audibly consistent as the grid shrinks at higher tempos.

use crate::control::ControlSelect;
use crate::gate::Gate;
use crate::tempo::PPQN;
use embassy_time::{Duration, Instant};
use num_derive::{FromPrimitive, ToPrimitive};
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Clock ticks per sequencer step; patterns advance on eighth notes.
pub const TICKS_PER_STEP: u32 = PPQN / 2;

/// Steps in one pattern.
pub const PATTERN_STEPS: usize = 8;

/// Odds of a step firing in random mode: one in ten.
const RANDOM_ODDS: u32 = 10;

/// The fixed pattern catalog, plus a synthetic random mode as the final selection.
///
/// Declaration order is the pot sweep order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PatternSelect {
    /// Every step fires.
    Steady,
    /// Every other step, starting on the beat.
    Downbeats,
    /// Every other step, starting off the beat.
    Offbeats,
    /// The first step of each half bar.
    Halves,
    /// A 3+3+2 tresillo figure.
    Tresillo,
    /// No lookup table; each step fires with a fixed probability instead.
    Random,
}

impl PatternSelect {
    /// The step table for a concrete pattern; `None` in random mode.
    pub fn steps(self) -> Option<&'static [bool; PATTERN_STEPS]> {
        match self {
            Self::Steady => Some(&[true, true, true, true, true, true, true, true]),
            Self::Downbeats => Some(&[true, false, true, false, true, false, true, false]),
            Self::Offbeats => Some(&[false, true, false, true, false, true, false, true]),
            Self::Halves => Some(&[true, false, false, false, true, false, false, false]),
            Self::Tresillo => Some(&[true, false, false, true, false, false, true, false]),
            Self::Random => None,
        }
    }
}

impl ControlSelect for PatternSelect {
    const COUNT: u8 = 6;
}

/// Derives the gate-A pulse train from the selected pattern.
pub struct PatternGate {
    selection: PatternSelect,
    last_step: Option<u32>,
    gate: Gate,
    rng: SmallRng,
}

impl PatternGate {
    /// Constructs the engine with the all-active pattern selected. The seed only matters for
    /// random mode; any entropy the caller has at hand is fine.
    pub fn new(seed: u64) -> Self {
        Self {
            selection: PatternSelect::Steady,
            last_step: None,
            gate: Gate::default(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Reselects the pattern from a fresh control sample. Returns whether the selection moved.
    pub fn select(&mut self, value: u16) -> bool {
        let next = PatternSelect::from_control(value);
        if next == self.selection {
            return false;
        }
        self.selection = next;
        true
    }

    /// The currently selected pattern.
    pub fn selection(&self) -> PatternSelect {
        self.selection
    }

    /// Advances the sequencer for one emitted clock tick. Returns whether the gate level changed.
    ///
    /// Only the first tick of a new step acts; the remaining ticks of the step are ignored, so
    /// the lookup (or the random roll) happens exactly once per step. A silent step leaves the
    /// gate alone — release is [`expire`][Self::expire]'s job, never the sequencer's.
    pub fn on_tick(&mut self, tick: u32, now: Instant) -> bool {
        let step = tick / TICKS_PER_STEP;
        if self.last_step == Some(step) {
            return false;
        }
        self.last_step = Some(step);

        let fire = match self.selection.steps() {
            Some(steps) => steps[step as usize % PATTERN_STEPS],
            None => self.rng.gen_range(0..RANDOM_ODDS) == 0,
        };
        if fire && !self.gate.is_high() {
            self.gate.raise(now);
            return true;
        }
        if fire {
            // already high from the previous step; restart the width without an edge
            self.gate.raise(now);
        }
        false
    }

    /// Timed deassertion, checked every pass independently of step edges. Returns whether the
    /// gate dropped on this call.
    pub fn expire(&mut self, now: Instant, gate_length: Duration) -> bool {
        self.gate.expire(now, gate_length)
    }

    /// Transport-stop path: forces the gate low and clears the edge detector so step 0
    /// retriggers on the next start.
    pub fn reset(&mut self) -> bool {
        self.last_step = None;
        let was_high = self.gate.is_high();
        self.gate.clear();
        was_high
    }

    /// The current gate-A level.
    pub fn is_high(&self) -> bool {
        self.gate.is_high()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(micros: u64) -> Instant {
        Instant::from_micros(micros)
    }

    #[test]
    fn steady_pattern_fires_on_every_step_edge() {
        let zero_width = Duration::from_micros(0);
        let mut engine = PatternGate::new(0);
        for step in 0..16_u32 {
            let now = at(u64::from(step) * 100_000);
            assert!(
                engine.on_tick(step * TICKS_PER_STEP, now),
                "Step {} should raise the gate",
                step
            );
            // drop the pulse immediately so the next edge is observable
            engine.expire(now, zero_width);
        }
    }

    #[test]
    fn the_lookup_happens_once_per_step() {
        let mut engine = PatternGate::new(0);
        assert!(engine.on_tick(0, at(0)), "The first tick of the step acts");
        for tick in 1..TICKS_PER_STEP {
            assert!(
                !engine.on_tick(tick, at(u64::from(tick))),
                "Tick {} shares step 0 and must not act",
                tick
            );
        }
    }

    #[test]
    fn silent_steps_never_raise_the_gate() {
        let mut engine = PatternGate::new(0);
        engine.select(sample_for(PatternSelect::Offbeats));
        assert_eq!(PatternSelect::Offbeats, engine.selection(), "Expected left but got right");

        assert!(!engine.on_tick(0, at(0)), "Step 0 of the offbeat pattern is silent");
        assert!(!engine.is_high());
        assert!(engine.on_tick(TICKS_PER_STEP, at(1_000)), "Step 1 fires");
        assert!(engine.is_high());
    }

    #[test]
    fn a_silent_step_leaves_a_running_pulse_alone() {
        let mut engine = PatternGate::new(0);
        engine.select(sample_for(PatternSelect::Downbeats));

        engine.on_tick(0, at(0));
        assert!(engine.is_high());
        engine.on_tick(TICKS_PER_STEP, at(1_000));
        assert!(engine.is_high(), "The silent step must not cut the pulse short");
    }

    #[test]
    fn pulse_width_follows_the_gate_length() {
        let length = Duration::from_micros(125_000);
        let mut engine = PatternGate::new(0);
        engine.on_tick(0, at(0));

        assert!(!engine.expire(at(124_999), length));
        assert!(engine.is_high());
        assert!(engine.expire(at(125_000), length));
        assert!(!engine.is_high());
    }

    #[test]
    fn patterns_wrap_after_eight_steps() {
        let mut engine = PatternGate::new(0);
        engine.select(sample_for(PatternSelect::Halves));

        // step 8 is step 0 of the second bar
        assert!(engine.on_tick(8 * TICKS_PER_STEP, at(0)), "Step 8 wraps onto the bar start");
    }

    #[test]
    fn random_mode_fires_at_roughly_the_configured_odds() {
        let zero_width = Duration::from_micros(0);
        let mut engine = PatternGate::new(42);
        engine.select(sample_for(PatternSelect::Random));
        assert_eq!(PatternSelect::Random, engine.selection(), "Expected left but got right");

        let mut fired = 0_u32;
        for step in 0..10_000_u32 {
            let now = at(u64::from(step) * 1_000);
            if engine.on_tick(step * TICKS_PER_STEP, now) {
                fired += 1;
            }
            // the roll happens once per step, on the edge tick only
            assert!(
                !engine.on_tick(step * TICKS_PER_STEP + 1, now),
                "Tick {} shares step {} and must not roll again",
                step * TICKS_PER_STEP + 1,
                step
            );
            // drop any pulse immediately so the next firing is observable
            engine.expire(now, zero_width);
        }

        // one-in-ten odds over 10 000 steps; the window is wide enough for any seed
        assert!(
            (800..=1200).contains(&fired),
            "Expected about 1000 of 10000 steps to fire but got {}",
            fired
        );
    }

    #[test]
    fn reset_clears_gate_and_edge_detector() {
        let mut engine = PatternGate::new(0);
        engine.on_tick(0, at(0));
        assert!(engine.reset(), "Reset should report the forced level change");
        assert!(!engine.is_high());
        assert!(engine.on_tick(0, at(1_000)), "Step 0 retriggers after a reset");
    }

    /// A control sample landing in the middle of the given selection's pot region.
    fn sample_for(selection: PatternSelect) -> u16 {
        let region = 4096 / u32::from(PatternSelect::COUNT);
        (region * selection as u32 + region / 2) as u16
    }
}
