//! Static configuration consumed by the travel switch at startup.
//!
//! Every value here is fixed before the first event is processed. Firmware
//! builds bake a [`SwitchConfig`] into flash; the emulator assembles one from
//! command-line flags.

use core::fmt;
use core::time::Duration;

/// How long the switch must stay pressed before the blink sequence starts.
pub const DEFAULT_HOLD_TIME: Duration = Duration::from_millis(1_000);
/// How long the LED stays lit after a hold attempt is abandoned.
pub const DEFAULT_LED_COOLDOWN: Duration = Duration::from_millis(500);
/// Number of full on/off pulses shown before power is cut.
pub const DEFAULT_BLINK_COUNT: u32 = 3;
/// Length of one full on/off pulse.
pub const DEFAULT_BLINK_INTERVAL: Duration = Duration::from_millis(200);
/// Upper bound on confirmation reads taken at boot.
pub const MAX_BOOT_SAMPLES: u8 = 16;

/// How the boot wake validator samples the switch level.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum BootSamplePolicy {
    /// Trust a single instantaneous read.
    #[default]
    Single,
    /// Require `samples` consecutive "held" reads spaced by `spacing`.
    Confirmed { samples: u8, spacing: Duration },
}

impl BootSamplePolicy {
    /// Number of reads the validator performs when every read reports "held".
    #[must_use]
    pub const fn sample_count(self) -> u8 {
        match self {
            BootSamplePolicy::Single => 1,
            BootSamplePolicy::Confirmed { samples, .. } => samples,
        }
    }

    /// Delay between successive reads.
    #[must_use]
    pub const fn spacing(self) -> Duration {
        match self {
            BootSamplePolicy::Single => Duration::ZERO,
            BootSamplePolicy::Confirmed { spacing, .. } => spacing,
        }
    }
}

/// Durations and counts that shape the hold gesture and its LED feedback.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SwitchConfig {
    pub hold_time: Duration,
    pub led_cooldown: Duration,
    pub blink_count: u32,
    pub blink_interval: Duration,
    pub boot_policy: BootSamplePolicy,
}

impl SwitchConfig {
    #[must_use]
    pub const fn new(
        hold_time: Duration,
        led_cooldown: Duration,
        blink_count: u32,
        blink_interval: Duration,
    ) -> Self {
        Self {
            hold_time,
            led_cooldown,
            blink_count,
            blink_interval,
            boot_policy: BootSamplePolicy::Single,
        }
    }

    /// Builds a configuration from raw millisecond values.
    #[must_use]
    pub const fn from_millis(
        hold_ms: u32,
        led_cooldown_ms: u32,
        blink_count: u32,
        blink_interval_ms: u32,
    ) -> Self {
        Self::new(
            Duration::from_millis(hold_ms as u64),
            Duration::from_millis(led_cooldown_ms as u64),
            blink_count,
            Duration::from_millis(blink_interval_ms as u64),
        )
    }

    /// Replaces the boot sampling policy.
    #[must_use]
    pub const fn with_boot_policy(mut self, policy: BootSamplePolicy) -> Self {
        self.boot_policy = policy;
        self
    }

    /// Delay between blink steps. Odd intervals round down to whole milliseconds.
    #[must_use]
    pub fn blink_half_period(&self) -> Duration {
        let half_ms = self.blink_interval.as_millis() / 2;
        Duration::from_millis(u64::try_from(half_ms).unwrap_or(u64::MAX))
    }

    /// Checks the parameters before the switch is brought up.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hold_time.is_zero() {
            return Err(ConfigError::ZeroHoldTime);
        }

        if self.blink_count > 0 && self.blink_half_period().is_zero() {
            return Err(ConfigError::BlinkIntervalTooShort {
                interval: self.blink_interval,
            });
        }

        let samples = self.boot_policy.sample_count();
        if samples == 0 || samples > MAX_BOOT_SAMPLES {
            return Err(ConfigError::BootSampleCount { requested: samples });
        }

        Ok(())
    }
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_HOLD_TIME,
            DEFAULT_LED_COOLDOWN,
            DEFAULT_BLINK_COUNT,
            DEFAULT_BLINK_INTERVAL,
        )
    }
}

/// Reasons a [`SwitchConfig`] is rejected.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// A zero hold time would power off on the first press.
    ZeroHoldTime,
    /// The blink interval cannot be split into two non-empty half-phases.
    BlinkIntervalTooShort { interval: Duration },
    /// Boot confirmation must take between 1 and [`MAX_BOOT_SAMPLES`] reads.
    BootSampleCount { requested: u8 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroHoldTime => f.write_str("hold time must be non-zero"),
            ConfigError::BlinkIntervalTooShort { interval } => write!(
                f,
                "blink interval {}ms is too short to split into half-phases",
                interval.as_millis()
            ),
            ConfigError::BootSampleCount { requested } => write!(
                f,
                "boot sample count {requested} outside 1-{MAX_BOOT_SAMPLES}"
            ),
        }
    }
}
