//! Boot-time wake validation.
//!
//! The board powers up when the switch is pressed. At boot the controller
//! checks whether the switch is still held: a held switch means a deliberate
//! wake that must now be confirmed by the full hold gesture, a released switch
//! means the wake was spurious and power is cut straight away.

use core::fmt;
use core::time::Duration;

use super::{SwitchState, TravelSwitch};
use crate::config::{BootSamplePolicy, ConfigError};
use crate::input::SwitchLevel;
use crate::output::{LedFault, LedOutput};
use crate::power::{PowerControl, PowerOffPath, PowerOffQueue};
use crate::telemetry::SwitchEvent;
use crate::timer::{TimerScheduler, TimerSlot};

/// Reads the instantaneous switch level during boot.
pub trait BootLevelReader {
    fn read_level(&mut self) -> Result<SwitchLevel, BootReadFault>;

    /// Waits between confirmation reads. Readers without a clock may return
    /// immediately.
    fn settle(&mut self, _delay: Duration) {}
}

impl<T: BootLevelReader + ?Sized> BootLevelReader for &mut T {
    fn read_level(&mut self) -> Result<SwitchLevel, BootReadFault> {
        (**self).read_level()
    }

    fn settle(&mut self, delay: Duration) {
        (**self).settle(delay);
    }
}

/// Reader for boards whose switch level cannot be sampled.
#[derive(Copy, Clone, Debug, Default)]
pub struct UnavailableLevel;

impl BootLevelReader for UnavailableLevel {
    fn read_level(&mut self) -> Result<SwitchLevel, BootReadFault> {
        Err(BootReadFault::NotReady)
    }
}

/// Why the boot level could not be determined.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BootReadFault {
    NotReady,
    ConfigureFailed,
    ReadFailed,
}

impl fmt::Display for BootReadFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootReadFault::NotReady => f.write_str("switch input not ready"),
            BootReadFault::ConfigureFailed => f.write_str("switch input configuration failed"),
            BootReadFault::ReadFailed => f.write_str("switch level read failed"),
        }
    }
}

/// What boot validation concluded.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BootOutcome {
    /// Switch held at boot; the hold gesture now decides.
    WakeValidation,
    /// Switch already released; power-off was requested.
    Spurious,
    /// Level unreadable; the switch starts idle.
    Degraded(BootReadFault),
}

impl BootOutcome {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            BootOutcome::WakeValidation => "wake-validation",
            BootOutcome::Spurious => "spurious-wake",
            BootOutcome::Degraded(_) => "degraded",
        }
    }
}

impl fmt::Display for BootOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootOutcome::Degraded(fault) => write!(f, "degraded ({fault})"),
            other => f.write_str(other.label()),
        }
    }
}

/// Fatal initialization failures.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InitError {
    Config(ConfigError),
    Led(LedFault),
    AlreadyBooted,
}

impl From<ConfigError> for InitError {
    fn from(err: ConfigError) -> Self {
        InitError::Config(err)
    }
}

impl From<LedFault> for InitError {
    fn from(err: LedFault) -> Self {
        InitError::Led(err)
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::Config(err) => write!(f, "invalid configuration: {err}"),
            InitError::Led(err) => write!(f, "LED unavailable: {err}"),
            InitError::AlreadyBooted => f.write_str("switch already booted"),
        }
    }
}

/// Samples the level according to `policy`. Any released read wins.
pub(crate) fn sample_boot_level<R>(
    reader: &mut R,
    policy: BootSamplePolicy,
) -> Result<SwitchLevel, BootReadFault>
where
    R: BootLevelReader + ?Sized,
{
    let samples = policy.sample_count().max(1);
    for index in 0..samples {
        if index > 0 {
            reader.settle(policy.spacing());
        }
        if reader.read_level()? == SwitchLevel::Released {
            return Ok(SwitchLevel::Released);
        }
    }
    Ok(SwitchLevel::Pressed)
}

impl<L, T, P, Q> TravelSwitch<L, T, P, Q>
where
    L: LedOutput,
    T: TimerScheduler,
    P: PowerControl,
    Q: PowerOffQueue,
{
    /// Brings the switch up and validates the wake.
    ///
    /// Must run once, before any input is handled.
    pub fn boot<R>(&mut self, reader: &mut R) -> Result<BootOutcome, InitError>
    where
        R: BootLevelReader + ?Sized,
    {
        if self.booted {
            return Err(InitError::AlreadyBooted);
        }

        self.config.validate()?;
        self.led.configure()?;
        self.booted = true;

        let outcome = match sample_boot_level(reader, self.config.boot_policy) {
            Ok(SwitchLevel::Pressed) => {
                self.pressed = true;
                self.set_led(true);
                self.arm(TimerSlot::Hold, self.config.hold_time);
                self.state = SwitchState::WakeupHoldPending;
                BootOutcome::WakeValidation
            }
            Ok(SwitchLevel::Released) => {
                self.pressed = false;
                self.set_led(false);
                self.state = SwitchState::ShuttingDown;
                BootOutcome::Spurious
            }
            Err(fault) => {
                self.pressed = false;
                self.set_led(false);
                self.state = SwitchState::Idle;
                BootOutcome::Degraded(fault)
            }
        };

        self.record(SwitchEvent::Booted {
            outcome,
            state: self.state,
        });

        if outcome == BootOutcome::Spurious {
            self.request_power_off(PowerOffPath::Direct);
        }

        Ok(outcome)
    }
}
