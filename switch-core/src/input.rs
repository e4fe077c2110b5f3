//! Input events delivered to the switch.
//!
//! The input source reports key transitions; only the power key drives the
//! travel switch. Timer expirations share the same tagged event type so one
//! transition function handles everything.

use core::fmt;

use crate::timer::TimerSlot;

/// Key code reported by the travel switch (`KEY_POWER`).
pub const KEY_POWER: u16 = 116;

/// Raw key transition as delivered by the input subsystem.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct InputEvent {
    pub code: u16,
    pub value: i32,
}

impl InputEvent {
    #[must_use]
    pub const fn key(code: u16, pressed: bool) -> Self {
        Self {
            code,
            value: if pressed { 1 } else { 0 },
        }
    }

    /// Power key transition.
    #[must_use]
    pub const fn power(pressed: bool) -> Self {
        Self::key(KEY_POWER, pressed)
    }
}

/// Physical level of the switch.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SwitchLevel {
    Pressed,
    Released,
}

impl SwitchLevel {
    #[must_use]
    pub const fn from_pressed(pressed: bool) -> Self {
        if pressed {
            SwitchLevel::Pressed
        } else {
            SwitchLevel::Released
        }
    }

    #[must_use]
    pub const fn is_pressed(self) -> bool {
        matches!(self, SwitchLevel::Pressed)
    }
}

impl fmt::Display for SwitchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchLevel::Pressed => f.write_str("pressed"),
            SwitchLevel::Released => f.write_str("released"),
        }
    }
}

/// Everything the switch state machine reacts to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SwitchInput {
    Press,
    Release,
    TimerFired(TimerSlot),
}

impl SwitchInput {
    /// Maps a raw input event, dropping keys other than [`KEY_POWER`].
    #[must_use]
    pub const fn from_input_event(event: &InputEvent) -> Option<Self> {
        if event.code != KEY_POWER {
            return None;
        }

        if event.value != 0 {
            Some(SwitchInput::Press)
        } else {
            Some(SwitchInput::Release)
        }
    }
}

impl fmt::Display for SwitchInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchInput::Press => f.write_str("press"),
            SwitchInput::Release => f.write_str("release"),
            SwitchInput::TimerFired(slot) => write!(f, "timer:{slot}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_power_key_events_reach_the_switch() {
        assert_eq!(
            SwitchInput::from_input_event(&InputEvent::power(true)),
            Some(SwitchInput::Press)
        );
        assert_eq!(
            SwitchInput::from_input_event(&InputEvent::power(false)),
            Some(SwitchInput::Release)
        );
        assert_eq!(SwitchInput::from_input_event(&InputEvent::key(30, true)), None);
    }

    #[test]
    fn any_nonzero_value_counts_as_press() {
        let repeat = InputEvent {
            code: KEY_POWER,
            value: 2,
        };
        assert_eq!(SwitchInput::from_input_event(&repeat), Some(SwitchInput::Press));
    }
}
