//! Firmware bindings for the travel switch state machine.
//!
//! The collaborators here are host-testable: [`DeadlineTimers`] maps timer
//! slots onto Embassy instants that the switch task sleeps towards, and
//! [`SignalPowerOffQueue`] hands deferred power-off requests back to the same
//! task through an Embassy [`Signal`]. GPIO-backed collaborators live in
//! [`hw`] and only build for the MCU target.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

pub mod hw;

#[cfg(not(target_os = "none"))]
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
#[cfg(target_os = "none")]
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant};
use travel_switch_core::timer::DeadlineTable;
use travel_switch_core::{
    InputEvent, PowerOffQueue, PowerOffRequest, PowerOffSubmitError, SwitchLevel, TimerScheduler,
    TimerSlot,
};

use crate::config::EDGE_QUEUE_DEPTH;

#[cfg(target_os = "none")]
type SwitchMutex = ThreadModeRawMutex;
#[cfg(not(target_os = "none"))]
type SwitchMutex = NoopRawMutex;

/// Debounced switch edges, produced by the input task.
pub type EdgeQueue = Channel<SwitchMutex, InputEvent, EDGE_QUEUE_DEPTH>;

pub type EdgeSender<'a> = Sender<'a, SwitchMutex, InputEvent, EDGE_QUEUE_DEPTH>;

pub type EdgeReceiver<'a> = Receiver<'a, SwitchMutex, InputEvent, EDGE_QUEUE_DEPTH>;

/// Deferred power-off handoff from the input path to the switch task.
pub type PowerOffSignal = Signal<SwitchMutex, PowerOffRequest>;

pub(crate) fn core_duration_to_embassy(duration: core::time::Duration) -> Duration {
    let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
    Duration::from_micros(micros)
}

/// Timer slots backed by absolute Embassy deadlines.
///
/// The switch task calls [`set_now`](Self::set_now) before dispatching so
/// delays are measured from the moment the input or expiration was observed.
pub struct DeadlineTimers {
    now: Instant,
    table: DeadlineTable<Instant>,
}

impl DeadlineTimers {
    pub const fn new(now: Instant) -> Self {
        Self {
            now,
            table: DeadlineTable::new(),
        }
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn set_now(&mut self, now: Instant) {
        self.now = now;
    }

    /// Earliest armed deadline, if any slot is armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.table.next_due().map(|(_, deadline)| deadline)
    }

    /// Disarms the earliest slot due by `now`, moving the clock to its
    /// deadline so follow-up delays keep their cadence.
    pub fn pop_due(&mut self, now: Instant) -> Option<TimerSlot> {
        let (slot, deadline) = self.table.next_due()?;
        if deadline > now {
            return None;
        }
        self.table.disarm(slot);
        self.now = deadline;
        Some(slot)
    }

    pub fn is_armed(&self, slot: TimerSlot) -> bool {
        self.table.is_armed(slot)
    }

    /// Moves the clock to `now` and pushes every armed deadline back by the
    /// time that passed, so slots armed during blocking boot sampling count
    /// from the end of sampling.
    pub fn catch_up(&mut self, now: Instant) {
        let Some(elapsed) = now.checked_duration_since(self.now) else {
            return;
        };
        for slot in TimerSlot::ALL {
            if let Some(deadline) = self.table.deadline(slot) {
                self.table.arm(slot, deadline + elapsed);
            }
        }
        self.now = now;
    }
}

impl TimerScheduler for DeadlineTimers {
    fn schedule(&mut self, slot: TimerSlot, delay: core::time::Duration) {
        self.table
            .arm(slot, self.now + core_duration_to_embassy(delay));
    }

    fn cancel(&mut self, slot: TimerSlot) {
        self.table.disarm(slot);
    }
}

/// [`PowerOffQueue`] that raises a [`PowerOffSignal`].
pub struct SignalPowerOffQueue<'a> {
    signal: &'a PowerOffSignal,
}

impl<'a> SignalPowerOffQueue<'a> {
    pub const fn new(signal: &'a PowerOffSignal) -> Self {
        Self { signal }
    }
}

impl PowerOffQueue for SignalPowerOffQueue<'_> {
    fn submit(&mut self, request: PowerOffRequest) -> Result<(), PowerOffSubmitError> {
        if self.signal.signaled() {
            return Err(PowerOffSubmitError::AlreadyPending);
        }
        self.signal.signal(request);
        Ok(())
    }
}

/// Turns sampled switch levels into power-key events, dropping repeats.
#[derive(Clone, Copy, Debug)]
pub struct EdgeFilter {
    last: SwitchLevel,
}

impl EdgeFilter {
    /// Starts from the level the switch was last known to be in.
    pub const fn new(initial: SwitchLevel) -> Self {
        Self { last: initial }
    }

    pub fn accept(&mut self, level: SwitchLevel) -> Option<InputEvent> {
        if level == self.last {
            return None;
        }
        self.last = level;
        Some(InputEvent::power(level.is_pressed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use travel_switch_core::{KEY_POWER, SwitchInput};

    fn at_ms(value: u64) -> Instant {
        Instant::from_millis(value)
    }

    #[test]
    fn delays_are_measured_from_the_current_instant() {
        let mut timers = DeadlineTimers::new(at_ms(0));
        timers.set_now(at_ms(40));
        timers.schedule(TimerSlot::Hold, core::time::Duration::from_millis(1_000));

        assert_eq!(timers.next_deadline(), Some(at_ms(1_040)));
        assert_eq!(timers.pop_due(at_ms(1_039)), None);
        assert_eq!(timers.pop_due(at_ms(1_045)), Some(TimerSlot::Hold));
        assert_eq!(timers.now(), at_ms(1_040));
        assert_eq!(timers.next_deadline(), None);
    }

    #[test]
    fn catch_up_counts_boot_timers_from_the_end_of_sampling() {
        let mut timers = DeadlineTimers::new(at_ms(0));
        timers.schedule(TimerSlot::Hold, core::time::Duration::from_millis(1_000));
        timers.catch_up(at_ms(10));

        assert_eq!(timers.now(), at_ms(10));
        assert_eq!(timers.next_deadline(), Some(at_ms(1_010)));
        assert_eq!(timers.pop_due(at_ms(1_005)), None);
    }

    #[test]
    fn catch_up_ignores_an_earlier_instant() {
        let mut timers = DeadlineTimers::new(at_ms(50));
        timers.schedule(TimerSlot::Cooldown, core::time::Duration::from_millis(500));
        timers.catch_up(at_ms(20));

        assert_eq!(timers.now(), at_ms(50));
        assert_eq!(timers.next_deadline(), Some(at_ms(550)));
    }

    #[test]
    fn cancel_disarms_only_the_named_slot() {
        let mut timers = DeadlineTimers::new(at_ms(0));
        timers.schedule(TimerSlot::Hold, core::time::Duration::from_millis(100));
        timers.schedule(TimerSlot::Cooldown, core::time::Duration::from_millis(50));
        timers.cancel(TimerSlot::Cooldown);

        assert!(timers.is_armed(TimerSlot::Hold));
        assert!(!timers.is_armed(TimerSlot::Cooldown));
        assert_eq!(timers.next_deadline(), Some(at_ms(100)));
    }

    #[test]
    fn second_submission_reports_already_pending() {
        let signal = PowerOffSignal::new();
        let mut queue = SignalPowerOffQueue::new(&signal);

        assert_eq!(queue.submit(PowerOffRequest), Ok(()));
        assert_eq!(
            queue.submit(PowerOffRequest),
            Err(PowerOffSubmitError::AlreadyPending)
        );
        assert_eq!(signal.try_take(), Some(PowerOffRequest));
    }

    #[test]
    fn edge_filter_reports_changes_only() {
        let mut filter = EdgeFilter::new(SwitchLevel::Pressed);

        assert_eq!(filter.accept(SwitchLevel::Pressed), None);
        let release = filter.accept(SwitchLevel::Released).expect("release edge");
        assert_eq!(release.code, KEY_POWER);
        assert_eq!(
            SwitchInput::from_input_event(&release),
            Some(SwitchInput::Release)
        );
        assert_eq!(filter.accept(SwitchLevel::Released), None);
        assert_eq!(
            filter
                .accept(SwitchLevel::Pressed)
                .and_then(|event| SwitchInput::from_input_event(&event)),
            Some(SwitchInput::Press)
        );
    }
}
