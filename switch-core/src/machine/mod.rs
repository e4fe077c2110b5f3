//! Hold-to-power-off switch state machine.
//!
//! [`TravelSwitch`] owns the switch state, the pressed flag and the blink
//! progress, and drives its collaborators (LED, timer slots, power control and
//! the deferred power-off queue). Every press, release and timer expiration is
//! funneled through [`TravelSwitch::handle`], a single exhaustive transition
//! function. The runtime guarantees that only one input is handled at a time.

use core::fmt;
use core::time::Duration;

use crate::config::SwitchConfig;
use crate::input::SwitchInput;
use crate::output::{LedOutput, NoopLed};
use crate::power::{
    NoopPowerControl, PowerControl, PowerOffMailbox, PowerOffPath, PowerOffQueue,
    PowerOffRequest, PowerOffSubmitError,
};
use crate::status::SwitchStatus;
use crate::telemetry::{SwitchEvent, TelemetryLog};
use crate::timer::{NoopTimers, TimerScheduler, TimerSlot};

pub mod blink;
pub mod boot;

pub use blink::{BlinkProgress, BlinkStep};
pub use boot::{BootLevelReader, BootOutcome, BootReadFault, InitError, UnavailableLevel};

/// Phase of the hold gesture.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SwitchState {
    Idle,
    HoldPending,
    LedCooldown,
    BlinkSequence,
    WakeupHoldPending,
    ShuttingDown,
}

impl SwitchState {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            SwitchState::Idle => "idle",
            SwitchState::HoldPending => "hold-pending",
            SwitchState::LedCooldown => "led-cooldown",
            SwitchState::BlinkSequence => "blink-sequence",
            SwitchState::WakeupHoldPending => "wakeup-hold-pending",
            SwitchState::ShuttingDown => "shutting-down",
        }
    }
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Travel switch controller bound to its collaborators.
pub struct TravelSwitch<
    L: LedOutput = NoopLed,
    T: TimerScheduler = NoopTimers,
    P: PowerControl = NoopPowerControl,
    Q: PowerOffQueue = PowerOffMailbox,
> {
    config: SwitchConfig,
    state: SwitchState,
    booted: bool,
    pressed: bool,
    led_on: bool,
    blink: BlinkProgress,
    power_off: Option<PowerOffPath>,
    led: L,
    timers: T,
    power: P,
    queue: Q,
    telemetry: TelemetryLog,
}

impl TravelSwitch {
    /// Creates a switch with no-op collaborators.
    #[must_use]
    pub fn new(config: SwitchConfig) -> Self {
        TravelSwitch::with_components(
            config,
            NoopLed::new(),
            NoopTimers::new(),
            NoopPowerControl::new(),
            PowerOffMailbox::new(),
        )
    }
}

impl<L, T, P, Q> TravelSwitch<L, T, P, Q>
where
    L: LedOutput,
    T: TimerScheduler,
    P: PowerControl,
    Q: PowerOffQueue,
{
    /// Creates a switch with supplied collaborators. Nothing is driven until
    /// [`boot`](Self::boot) runs.
    pub fn with_components(config: SwitchConfig, led: L, timers: T, power: P, queue: Q) -> Self {
        Self {
            config,
            state: SwitchState::Idle,
            booted: false,
            pressed: false,
            led_on: false,
            blink: BlinkProgress::default(),
            power_off: None,
            led,
            timers,
            power,
            queue,
            telemetry: TelemetryLog::new(),
        }
    }

    pub fn config(&self) -> &SwitchConfig {
        &self.config
    }

    pub fn state(&self) -> SwitchState {
        self.state
    }

    /// Returns `true` once [`boot`](Self::boot) has succeeded.
    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Last known physical level of the switch.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Level most recently driven onto the LED.
    pub fn led_level(&self) -> bool {
        self.led_on
    }

    pub fn blink_progress(&self) -> BlinkProgress {
        self.blink
    }

    /// Path used for the power-off request, once one was issued.
    pub fn power_off_path(&self) -> Option<PowerOffPath> {
        self.power_off
    }

    /// Point-in-time view of the controller.
    pub fn status(&self) -> SwitchStatus {
        SwitchStatus {
            state: self.state,
            pressed: self.pressed,
            led_on: self.led_on,
            blink_remaining: (self.state == SwitchState::BlinkSequence)
                .then_some(self.blink.remaining()),
            power_off: self.power_off,
        }
    }

    pub fn led(&self) -> &L {
        &self.led
    }

    pub fn led_mut(&mut self) -> &mut L {
        &mut self.led
    }

    pub fn timers(&self) -> &T {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut T {
        &mut self.timers
    }

    pub fn power(&self) -> &P {
        &self.power
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut Q {
        &mut self.queue
    }

    pub fn telemetry(&self) -> &TelemetryLog {
        &self.telemetry
    }

    pub fn telemetry_mut(&mut self) -> &mut TelemetryLog {
        &mut self.telemetry
    }

    /// Input source callback for a press edge.
    pub fn on_press(&mut self) {
        self.handle(SwitchInput::Press);
    }

    /// Input source callback for a release edge.
    pub fn on_release(&mut self) {
        self.handle(SwitchInput::Release);
    }

    /// Scheduler callback for an expired slot.
    pub fn on_timer(&mut self, slot: TimerSlot) {
        self.handle(SwitchInput::TimerFired(slot));
    }

    /// Applies one input to the state machine.
    pub fn handle(&mut self, input: SwitchInput) {
        if !self.booted {
            self.record(SwitchEvent::InputIgnored {
                state: self.state,
                input,
            });
            return;
        }

        match input {
            SwitchInput::Press => self.pressed = true,
            SwitchInput::Release => self.pressed = false,
            SwitchInput::TimerFired(_) => {}
        }

        match (self.state, input) {
            (SwitchState::Idle, SwitchInput::Press) => {
                self.set_led(true);
                self.arm(TimerSlot::Hold, self.config.hold_time);
                self.transition(SwitchState::HoldPending, input);
            }
            (SwitchState::LedCooldown, SwitchInput::Press) => {
                // A re-press restarts the full hold requirement.
                self.timers.cancel(TimerSlot::Cooldown);
                self.set_led(true);
                self.arm(TimerSlot::Hold, self.config.hold_time);
                self.transition(SwitchState::HoldPending, input);
            }
            (SwitchState::HoldPending, SwitchInput::Release) => {
                // LED stays lit until the cooldown expires.
                self.timers.cancel(TimerSlot::Hold);
                self.arm(TimerSlot::Cooldown, self.config.led_cooldown);
                self.transition(SwitchState::LedCooldown, input);
            }
            (SwitchState::WakeupHoldPending, SwitchInput::Release) => {
                self.timers.cancel(TimerSlot::Hold);
                self.shut_down(PowerOffPath::Deferred, Some(input));
            }
            (SwitchState::BlinkSequence, SwitchInput::Release) if self.blink.is_complete() => {
                self.shut_down(PowerOffPath::Deferred, Some(input));
            }
            (
                SwitchState::HoldPending | SwitchState::WakeupHoldPending,
                SwitchInput::TimerFired(TimerSlot::Hold),
            ) => self.start_blink_sequence(input),
            (SwitchState::LedCooldown, SwitchInput::TimerFired(TimerSlot::Cooldown)) => {
                self.set_led(false);
                self.transition(SwitchState::Idle, input);
            }
            (SwitchState::BlinkSequence, SwitchInput::TimerFired(TimerSlot::BlinkStep)) => {
                self.blink_step();
            }
            (state, SwitchInput::TimerFired(slot)) => {
                self.record(SwitchEvent::StaleTimer { state, slot });
            }
            (state, SwitchInput::Press | SwitchInput::Release) => {
                self.record(SwitchEvent::InputIgnored { state, input });
            }
        }
    }

    /// Runs a power-off that was submitted to the deferred queue.
    ///
    /// Call this from the runtime's deferred context, never from inside
    /// [`handle`](Self::handle).
    pub fn run_deferred_power_off(&mut self, _request: PowerOffRequest) {
        if self.power_off != Some(PowerOffPath::Deferred) {
            return;
        }

        self.record(SwitchEvent::PowerOffExecuted);
        self.power.power_off();
    }

    fn start_blink_sequence(&mut self, cause: SwitchInput) {
        self.blink = BlinkProgress::start(self.config.blink_count);
        self.set_led(false);
        self.arm(TimerSlot::BlinkStep, self.config.blink_half_period());
        self.transition(SwitchState::BlinkSequence, cause);
    }

    fn blink_step(&mut self) {
        let step = self.blink.advance();
        match step {
            BlinkStep::Complete => {
                self.set_led(false);
                self.record(SwitchEvent::BlinkComplete {
                    pressed: self.pressed,
                });
                if !self.pressed {
                    self.shut_down(PowerOffPath::Direct, None);
                }
                // Still held: the next release finishes the shutdown.
            }
            BlinkStep::Lit { .. } | BlinkStep::Unlit { .. } => {
                self.set_led(step.led_level());
                self.record(SwitchEvent::BlinkPhase(step));
                self.arm(TimerSlot::BlinkStep, self.config.blink_half_period());
            }
        }
    }

    fn shut_down(&mut self, path: PowerOffPath, cause: Option<SwitchInput>) {
        self.cancel_all();
        self.set_led(false);
        self.record(SwitchEvent::Transition {
            from: self.state,
            to: SwitchState::ShuttingDown,
            cause,
        });
        self.state = SwitchState::ShuttingDown;
        self.request_power_off(path);
    }

    fn request_power_off(&mut self, path: PowerOffPath) {
        match path {
            PowerOffPath::Direct => {
                self.power_off = Some(PowerOffPath::Direct);
                self.record(SwitchEvent::PowerOffRequested(PowerOffPath::Direct));
                self.power.power_off();
            }
            PowerOffPath::Deferred => match self.queue.submit(PowerOffRequest) {
                Ok(()) | Err(PowerOffSubmitError::AlreadyPending) => {
                    self.power_off = Some(PowerOffPath::Deferred);
                    self.record(SwitchEvent::PowerOffRequested(PowerOffPath::Deferred));
                }
                Err(PowerOffSubmitError::Disconnected) => {
                    // Power control is off limits here; the request is dropped.
                    self.record(SwitchEvent::PowerOffQueueLost);
                }
            },
        }
    }

    fn arm(&mut self, slot: TimerSlot, delay: Duration) {
        self.timers.cancel(slot);
        self.timers.schedule(slot, delay);
    }

    fn cancel_all(&mut self) {
        for slot in TimerSlot::ALL {
            self.timers.cancel(slot);
        }
    }

    fn set_led(&mut self, on: bool) {
        self.led.set(on);
        self.led_on = on;
    }

    fn transition(&mut self, to: SwitchState, cause: SwitchInput) {
        self.record(SwitchEvent::Transition {
            from: self.state,
            to,
            cause: Some(cause),
        });
        self.state = to;
    }

    fn record(&mut self, event: SwitchEvent) {
        self.telemetry.record(event);
    }
}
