//! Snapshot of the switch for status reporting.

use core::fmt;

use crate::machine::SwitchState;
use crate::power::PowerOffPath;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SwitchStatus {
    pub state: SwitchState,
    pub pressed: bool,
    pub led_on: bool,
    /// Cycles still to show, only while blinking.
    pub blink_remaining: Option<u32>,
    pub power_off: Option<PowerOffPath>,
}

impl fmt::Display for SwitchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "state={} switch={} led={}",
            self.state,
            if self.pressed { "pressed" } else { "released" },
            if self.led_on { "on" } else { "off" },
        )?;

        if let Some(remaining) = self.blink_remaining {
            write!(f, " blinks-left={remaining}")?;
        }

        if let Some(path) = self.power_off {
            write!(f, " power-off={path}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;
    use heapless::String;

    fn render(status: &SwitchStatus) -> String<96> {
        let mut out = String::new();
        write!(out, "{status}").unwrap();
        out
    }

    #[test]
    fn renders_optional_fields_only_when_present() {
        let idle = SwitchStatus {
            state: SwitchState::Idle,
            pressed: false,
            led_on: false,
            blink_remaining: None,
            power_off: None,
        };
        assert_eq!(render(&idle).as_str(), "state=idle switch=released led=off");

        let blinking = SwitchStatus {
            state: SwitchState::BlinkSequence,
            pressed: true,
            led_on: true,
            blink_remaining: Some(2),
            power_off: None,
        };
        assert_eq!(
            render(&blinking).as_str(),
            "state=blink-sequence switch=pressed led=on blinks-left=2"
        );
    }
}
