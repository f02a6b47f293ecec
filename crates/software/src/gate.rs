//! The shared gate-output primitive: a boolean level plus the instant it was last raised.
//! Raising is always caller-driven; dropping happens either on a timed expiry (pulse-style
//! gates) or by an explicit clear (level-style gates and transport stop).

use embassy_time::{Duration, Instant};

/// One physical gate output, as seen by the engine that owns it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gate {
    level: bool,
    raised_at: Instant,
}

impl Default for Gate {
    fn default() -> Self {
        Self {
            level: false,
            raised_at: Instant::from_micros(0),
        }
    }
}

impl Gate {
    /// Drives the gate high and records the assertion instant.
    pub fn raise(&mut self, now: Instant) {
        self.level = true;
        self.raised_at = now;
    }

    /// Drops the gate once `length` has elapsed since it was raised. Returns whether the
    /// level changed on this call.
    pub fn expire(&mut self, now: Instant, length: Duration) -> bool {
        if self.level && now.saturating_duration_since(self.raised_at) >= length {
            self.level = false;
            return true;
        }
        false
    }

    /// Forces the gate low immediately, regardless of any pending expiry.
    pub fn clear(&mut self) {
        self.level = false;
    }

    /// The current output level.
    pub fn is_high(&self) -> bool {
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LENGTH: Duration = Duration::from_millis(125);

    fn at(micros: u64) -> Instant {
        Instant::from_micros(micros)
    }

    #[test]
    fn starts_low() {
        assert!(!Gate::default().is_high());
    }

    #[test]
    fn expires_only_after_the_full_length() {
        let mut gate = Gate::default();
        gate.raise(at(1_000));
        assert!(gate.is_high());

        assert!(!gate.expire(at(1_000 + LENGTH.as_micros() - 1), LENGTH));
        assert!(gate.is_high(), "The pulse must hold for its full width");

        assert!(gate.expire(at(1_000 + LENGTH.as_micros()), LENGTH));
        assert!(!gate.is_high());
    }

    #[test]
    fn expire_on_a_low_gate_reports_no_change() {
        let mut gate = Gate::default();
        assert!(!gate.expire(at(10_000_000), LENGTH));
    }

    #[test]
    fn retrigger_restarts_the_pulse() {
        let mut gate = Gate::default();
        gate.raise(at(0));
        gate.raise(at(100_000));
        assert!(
            !gate.expire(at(LENGTH.as_micros()), LENGTH),
            "The width is measured from the most recent assertion"
        );
        assert!(gate.expire(at(100_000 + LENGTH.as_micros()), LENGTH));
    }

    #[test]
    fn clear_drops_the_level_mid_pulse() {
        let mut gate = Gate::default();
        gate.raise(at(0));
        gate.clear();
        assert!(!gate.is_high());
    }
}
