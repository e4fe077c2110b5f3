//! Board configuration for the travel switch.
//!
//! Pin assignment (STM32G0B1KE):
//! - PA0 / EXTI0: hold switch, active low with internal pull-up
//! - PA5: feedback LED, active high
//! - PB0: power latch enable, held high while the board should stay powered

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use core::time::Duration;

use travel_switch_core::{BootSamplePolicy, SwitchConfig};

/// Switch timing baked into the firmware image.
pub const SWITCH_CONFIG: SwitchConfig = SwitchConfig::from_millis(1_000, 500, 3, 200)
    .with_boot_policy(BootSamplePolicy::Confirmed {
        samples: 3,
        spacing: Duration::from_millis(5),
    });

/// Quiet time required after an edge before the level is trusted.
pub const INPUT_DEBOUNCE_MS: u64 = 15;

/// Switch edges buffered between the input task and the switch task.
pub const EDGE_QUEUE_DEPTH: usize = 4;
