//! GPIO-backed collaborators for the STM32G0 board.

#![cfg(target_os = "none")]

use core::time::Duration;

use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Level, Output};
use travel_switch_core::{
    BootLevelReader, BootReadFault, LedFault, LedOutput, PowerControl, SwitchLevel,
};

use super::core_duration_to_embassy;

/// Feedback LED on a push-pull output, active high.
pub struct LedPin<'d> {
    pin: Output<'d>,
}

impl<'d> LedPin<'d> {
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }
}

impl LedOutput for LedPin<'_> {
    fn configure(&mut self) -> Result<(), LedFault> {
        // The pin is already an output; start from a known dark level.
        self.pin.set_low();
        Ok(())
    }

    fn set(&mut self, on: bool) {
        self.pin.set_level(Level::from(on));
    }
}

/// Power latch enable. Driving it low cuts the board supply.
pub struct PowerLatch<'d> {
    enable: Output<'d>,
}

impl<'d> PowerLatch<'d> {
    /// Takes over an enable pin that was initialized high.
    pub fn new(enable: Output<'d>) -> Self {
        Self { enable }
    }
}

impl PowerControl for PowerLatch<'_> {
    fn power_off(&mut self) {
        defmt::warn!("power: releasing latch");
        self.enable.set_low();
    }
}

/// Samples the switch pin directly during boot. The switch pulls the line low
/// when pressed.
pub struct SwitchPinReader<'a, 'd> {
    input: &'a ExtiInput<'d>,
}

impl<'a, 'd> SwitchPinReader<'a, 'd> {
    pub fn new(input: &'a ExtiInput<'d>) -> Self {
        Self { input }
    }
}

impl BootLevelReader for SwitchPinReader<'_, '_> {
    fn read_level(&mut self) -> Result<SwitchLevel, BootReadFault> {
        Ok(SwitchLevel::from_pressed(self.input.is_low()))
    }

    fn settle(&mut self, delay: Duration) {
        embassy_time::block_for(core_duration_to_embassy(delay));
    }
}
