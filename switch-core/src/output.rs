//! Digital output contract for the feedback LED.

use core::fmt;

/// Failure bringing up the LED output. Always fatal at boot.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LedFault {
    /// The output port is not ready.
    NotReady,
    /// The pin could not be configured as an output.
    ConfigureFailed,
}

impl fmt::Display for LedFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedFault::NotReady => f.write_str("LED output not ready"),
            LedFault::ConfigureFailed => f.write_str("failed to configure LED output"),
        }
    }
}

/// Abstraction over the physical LED driver.
pub trait LedOutput {
    /// Configures the output, leaving the LED unlit.
    fn configure(&mut self) -> Result<(), LedFault>;

    /// Drives the LED. Infallible once configured.
    fn set(&mut self, on: bool);
}

impl<T: LedOutput + ?Sized> LedOutput for &mut T {
    fn configure(&mut self) -> Result<(), LedFault> {
        (**self).configure()
    }

    fn set(&mut self, on: bool) {
        (**self).set(on);
    }
}

/// LED driver that performs no hardware interaction.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopLed;

impl NoopLed {
    /// Creates a new no-op LED driver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LedOutput for NoopLed {
    fn configure(&mut self) -> Result<(), LedFault> {
        Ok(())
    }

    fn set(&mut self, _: bool) {}
}
