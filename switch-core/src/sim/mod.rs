//! Virtual-time harness for driving a [`TravelSwitch`] off target.
//!
//! [`Simulator`] wires the switch to recording collaborators and a
//! [`VirtualTimers`] scheduler whose clock only moves when the caller advances
//! it. Timer expirations are replayed in deadline order, deferred power-off
//! requests run right after the handler that queued them returns, and every
//! LED edge and telemetry record is stamped with the virtual time it happened
//! at. Integration tests and the emulator both build on it.

use core::fmt;
use core::time::Duration;

use heapless::Deque;

use crate::config::SwitchConfig;
use crate::input::{SwitchInput, SwitchLevel};
use crate::machine::{
    BootLevelReader, BootOutcome, BootReadFault, InitError, SwitchState, TravelSwitch,
};
use crate::output::{LedFault, LedOutput};
use crate::power::{PowerControl, PowerOffMailbox};
use crate::status::SwitchStatus;
use crate::telemetry::TelemetryRecord;
use crate::timer::{DeadlineTable, TimerScheduler, TimerSlot};

/// LED edges retained by the simulator.
pub const LED_TRACE_CAPACITY: usize = 64;
/// Stamped telemetry records retained between drains.
pub const JOURNAL_CAPACITY: usize = 64;

/// Scheduler backed by a manually advanced clock.
#[derive(Clone, Debug, Default)]
pub struct VirtualTimers {
    now: Duration,
    table: DeadlineTable<Duration>,
}

impl VirtualTimers {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
            table: DeadlineTable::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Moves the clock. Deadlines already due stay armed until popped.
    pub fn set_now(&mut self, now: Duration) {
        self.now = now;
    }

    pub fn deadline(&self, slot: TimerSlot) -> Option<Duration> {
        self.table.deadline(slot)
    }

    pub fn is_armed(&self, slot: TimerSlot) -> bool {
        self.table.is_armed(slot)
    }

    pub fn next_due(&self) -> Option<(TimerSlot, Duration)> {
        self.table.next_due()
    }

    /// Disarms the earliest slot due at or before `until` and moves the clock
    /// to its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerSlot, Duration)> {
        let (slot, deadline) = self.table.next_due()?;
        if deadline > until {
            return None;
        }
        self.table.disarm(slot);
        self.now = self.now.max(deadline);
        Some((slot, deadline))
    }

    /// Pushes every armed deadline back by `by`.
    pub fn delay_armed(&mut self, by: Duration) {
        for slot in TimerSlot::ALL {
            if let Some(deadline) = self.table.deadline(slot) {
                self.table.arm(slot, deadline.saturating_add(by));
            }
        }
    }
}

impl TimerScheduler for VirtualTimers {
    /// Deadlines past the end of representable time clamp to `Duration::MAX`.
    fn schedule(&mut self, slot: TimerSlot, delay: Duration) {
        self.table.arm(slot, self.now.saturating_add(delay));
    }

    fn cancel(&mut self, slot: TimerSlot) {
        self.table.disarm(slot);
    }
}

/// LED double that keeps its level and the writes not yet collected.
#[derive(Clone, Debug, Default)]
pub struct RecordingLed {
    level: bool,
    configured: bool,
    fault: Option<LedFault>,
    pending: Deque<bool, 8>,
}

impl RecordingLed {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            level: false,
            configured: false,
            fault: None,
            pending: Deque::new(),
        }
    }

    /// LED whose configuration always fails with `fault`.
    #[must_use]
    pub const fn failing(fault: LedFault) -> Self {
        Self {
            level: false,
            configured: false,
            fault: Some(fault),
            pending: Deque::new(),
        }
    }

    pub fn level(&self) -> bool {
        self.level
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    fn take_write(&mut self) -> Option<bool> {
        self.pending.pop_front()
    }
}

impl LedOutput for RecordingLed {
    fn configure(&mut self) -> Result<(), LedFault> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }
        self.configured = true;
        self.level = false;
        Ok(())
    }

    fn set(&mut self, on: bool) {
        self.level = on;
        if self.pending.is_full() {
            self.pending.pop_front();
        }
        let _ = self.pending.push_back(on);
    }
}

/// Power latch double that counts power-off calls.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecordingPower {
    calls: u32,
}

impl RecordingPower {
    #[must_use]
    pub const fn new() -> Self {
        Self { calls: 0 }
    }

    pub fn calls(&self) -> u32 {
        self.calls
    }
}

impl PowerControl for RecordingPower {
    fn power_off(&mut self) {
        self.calls = self.calls.saturating_add(1);
    }
}

/// Switch level seen by the boot validator in a simulated run.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BootScenario {
    Held,
    Released,
    Unreadable,
}

impl BootScenario {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            BootScenario::Held => "held",
            BootScenario::Released => "released",
            BootScenario::Unreadable => "unreadable",
        }
    }
}

impl fmt::Display for BootScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Boot reader replaying a fixed series of reads. Once exhausted it keeps
/// returning the last one.
#[derive(Clone, Debug)]
pub struct ScriptedLevel {
    readings: Deque<Result<SwitchLevel, BootReadFault>, 16>,
    last: Result<SwitchLevel, BootReadFault>,
    reads: u32,
}

impl ScriptedLevel {
    /// Reader that always reports `reading`.
    #[must_use]
    pub const fn constant(reading: Result<SwitchLevel, BootReadFault>) -> Self {
        Self {
            readings: Deque::new(),
            last: reading,
            reads: 0,
        }
    }

    /// Reader that reports `readings` in order. Readings past the internal
    /// capacity are dropped.
    #[must_use]
    pub fn sequence(readings: &[Result<SwitchLevel, BootReadFault>]) -> Self {
        let mut reader = Self::constant(Err(BootReadFault::NotReady));
        for reading in readings {
            if reader.readings.push_back(*reading).is_err() {
                break;
            }
        }
        reader
    }

    /// Number of reads performed.
    pub fn reads(&self) -> u32 {
        self.reads
    }
}

impl From<BootScenario> for ScriptedLevel {
    fn from(scenario: BootScenario) -> Self {
        Self::constant(match scenario {
            BootScenario::Held => Ok(SwitchLevel::Pressed),
            BootScenario::Released => Ok(SwitchLevel::Released),
            BootScenario::Unreadable => Err(BootReadFault::ReadFailed),
        })
    }
}

impl BootLevelReader for ScriptedLevel {
    fn read_level(&mut self) -> Result<SwitchLevel, BootReadFault> {
        self.reads = self.reads.saturating_add(1);
        if let Some(reading) = self.readings.pop_front() {
            self.last = reading;
        }
        self.last
    }
}

/// Switch wired to the simulator's recording collaborators.
pub type SimSwitch = TravelSwitch<RecordingLed, VirtualTimers, RecordingPower, PowerOffMailbox>;

/// LED level change at a virtual instant.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LedEdge {
    pub at: Duration,
    pub on: bool,
}

/// Telemetry record stamped with the virtual time it was emitted at.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StampedRecord {
    pub at: Duration,
    pub record: TelemetryRecord,
}

impl fmt::Display for StampedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>6}ms] {}", self.at.as_millis(), self.record)
    }
}

pub struct Simulator {
    switch: SimSwitch,
    led_level: bool,
    led_edges: Deque<LedEdge, LED_TRACE_CAPACITY>,
    journal: Deque<StampedRecord, JOURNAL_CAPACITY>,
    power_off_at: Option<Duration>,
}

impl Simulator {
    #[must_use]
    pub fn new(config: SwitchConfig) -> Self {
        Self::with_led(config, RecordingLed::new())
    }

    #[must_use]
    pub fn with_led(config: SwitchConfig, led: RecordingLed) -> Self {
        Self {
            switch: TravelSwitch::with_components(
                config,
                led,
                VirtualTimers::new(),
                RecordingPower::new(),
                PowerOffMailbox::new(),
            ),
            led_level: false,
            led_edges: Deque::new(),
            journal: Deque::new(),
            power_off_at: None,
        }
    }

    /// Boots with the level `scenario` describes.
    pub fn boot(&mut self, scenario: BootScenario) -> Result<BootOutcome, InitError> {
        self.boot_with(&mut ScriptedLevel::from(scenario))
    }

    /// Boots with a caller-supplied reader. Settle delays advance virtual time.
    pub fn boot_with<R>(&mut self, reader: &mut R) -> Result<BootOutcome, InitError>
    where
        R: BootLevelReader + ?Sized,
    {
        let mut clocked = ClockedReader {
            inner: reader,
            elapsed: Duration::ZERO,
        };
        let start = self.now();
        let result = self.switch.boot(&mut clocked);
        let booted_at = start.saturating_add(clocked.elapsed);
        // Timers armed during boot count from the end of sampling.
        let timers = self.switch.timers_mut();
        timers.delay_armed(clocked.elapsed);
        timers.set_now(booted_at);
        self.settle();
        result
    }

    pub fn press(&mut self) {
        self.dispatch(SwitchInput::Press);
    }

    pub fn release(&mut self) {
        self.dispatch(SwitchInput::Release);
    }

    /// Presses, holds for `duration`, then releases.
    pub fn hold_for(&mut self, duration: Duration) {
        self.press();
        self.advance(duration);
        self.release();
    }

    /// Moves virtual time forward, firing every timer that falls due.
    pub fn advance(&mut self, by: Duration) {
        let target = self.now().saturating_add(by);
        self.advance_to(target);
    }

    /// Moves virtual time to `target`, firing due timers in deadline order.
    /// Targets in the past are ignored.
    pub fn advance_to(&mut self, target: Duration) {
        while let Some((slot, _)) = self.switch.timers_mut().pop_due(target) {
            self.switch.on_timer(slot);
            self.settle();
        }
        let now = self.now().max(target);
        self.switch.timers_mut().set_now(now);
    }

    pub fn now(&self) -> Duration {
        self.switch.timers().now()
    }

    pub fn switch(&self) -> &SimSwitch {
        &self.switch
    }

    pub fn state(&self) -> SwitchState {
        self.switch.state()
    }

    pub fn status(&self) -> SwitchStatus {
        self.switch.status()
    }

    pub fn led_level(&self) -> bool {
        self.led_level
    }

    pub fn led_edges(&self) -> impl Iterator<Item = &LedEdge> + '_ {
        self.led_edges.iter()
    }

    /// Virtual time of the first power-off, if one happened.
    pub fn power_off_at(&self) -> Option<Duration> {
        self.power_off_at
    }

    pub fn power_off_count(&self) -> u32 {
        self.switch.power().calls()
    }

    pub fn is_armed(&self, slot: TimerSlot) -> bool {
        self.switch.timers().is_armed(slot)
    }

    pub fn journal(&self) -> impl Iterator<Item = &StampedRecord> + '_ {
        self.journal.iter()
    }

    #[cfg(feature = "alloc")]
    pub fn take_journal(&mut self) -> alloc::vec::Vec<StampedRecord> {
        let mut records = alloc::vec::Vec::with_capacity(self.journal.len());
        while let Some(record) = self.journal.pop_front() {
            records.push(record);
        }
        records
    }

    fn dispatch(&mut self, input: SwitchInput) {
        self.switch.handle(input);
        self.settle();
    }

    /// Collects side effects of the last handler and runs deferred work.
    fn settle(&mut self) {
        if let Some(request) = self.switch.queue_mut().take() {
            self.collect();
            self.switch.run_deferred_power_off(request);
        }
        self.collect();
    }

    fn collect(&mut self) {
        let now = self.now();

        while let Some(on) = self.switch.led_mut().take_write() {
            if on != self.led_level {
                self.led_level = on;
                if self.led_edges.is_full() {
                    self.led_edges.pop_front();
                }
                let _ = self.led_edges.push_back(LedEdge { at: now, on });
            }
        }

        if self.power_off_at.is_none() && self.switch.power().calls() > 0 {
            self.power_off_at = Some(now);
        }

        while let Some(record) = self.switch.telemetry_mut().pop_oldest() {
            if self.journal.is_full() {
                self.journal.pop_front();
            }
            let _ = self.journal.push_back(StampedRecord { at: now, record });
        }
    }
}

/// Adapter that accumulates settle delays instead of sleeping.
struct ClockedReader<'a, R: ?Sized> {
    inner: &'a mut R,
    elapsed: Duration,
}

impl<R> BootLevelReader for ClockedReader<'_, R>
where
    R: BootLevelReader + ?Sized,
{
    fn read_level(&mut self) -> Result<SwitchLevel, BootReadFault> {
        self.inner.read_level()
    }

    fn settle(&mut self, delay: Duration) {
        self.elapsed = self.elapsed.saturating_add(delay);
        self.inner.settle(delay);
    }
}
