#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;

// Hold-to-power-off travel switch logic.
//
// This crate stays portable across MCU firmware and host tooling by avoiding the
// Rust standard library. Hardware collaborators (LED, timers, power latch, boot
// level reader) are expressed as traits the firmware and emulator implement.

pub mod config;
pub mod input;
pub mod machine;
pub mod output;
pub mod power;
pub mod script;
pub mod sim;
pub mod status;
pub mod telemetry;
pub mod timer;

pub use config::{BootSamplePolicy, ConfigError, SwitchConfig};
pub use input::{InputEvent, KEY_POWER, SwitchInput, SwitchLevel};
pub use machine::{
    BootLevelReader, BootOutcome, BootReadFault, InitError, SwitchState, TravelSwitch,
};
pub use output::{LedFault, LedOutput};
pub use power::{PowerControl, PowerOffPath, PowerOffQueue, PowerOffRequest, PowerOffSubmitError};
pub use timer::{TimerScheduler, TimerSlot};
