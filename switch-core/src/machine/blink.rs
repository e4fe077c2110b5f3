//! Blink sequencer progress.
//!
//! A sequence is `count` full on/off cycles, each split into two half-phase
//! steps, followed by one completion step.

/// Remaining cycles and the LED phase within the current cycle.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct BlinkProgress {
    remaining: u32,
    lit: bool,
}

impl BlinkProgress {
    /// Fresh sequence of `count` cycles starting unlit.
    #[must_use]
    pub const fn start(count: u32) -> Self {
        Self {
            remaining: count,
            lit: false,
        }
    }

    /// Full cycles still to show.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub const fn is_lit(&self) -> bool {
        self.lit
    }

    /// `true` once every cycle has been shown.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.remaining == 0
    }

    /// Advances one half-phase and reports what the LED must do.
    pub fn advance(&mut self) -> BlinkStep {
        if self.remaining == 0 {
            self.lit = false;
            return BlinkStep::Complete;
        }

        if self.lit {
            self.lit = false;
            self.remaining -= 1;
            BlinkStep::Unlit {
                remaining: self.remaining,
            }
        } else {
            self.lit = true;
            BlinkStep::Lit {
                remaining: self.remaining,
            }
        }
    }
}

/// Outcome of one blink step.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BlinkStep {
    /// First half of a cycle.
    Lit { remaining: u32 },
    /// Second half of a cycle; `remaining` already counts this cycle as done.
    Unlit { remaining: u32 },
    /// No cycles left.
    Complete,
}

impl BlinkStep {
    /// LED level the step leaves behind.
    #[must_use]
    pub const fn led_level(self) -> bool {
        matches!(self, BlinkStep::Lit { .. })
    }
}
