//! Telemetry emitted by the travel switch.
//!
//! The state machine never logs directly. It appends [`TelemetryRecord`]s to a
//! bounded [`TelemetryLog`] that the runtime drains into its own sink (defmt on
//! target, stdout on host). When the log is full the oldest record is evicted
//! and counted so the sink can report the gap.

use core::fmt;

use heapless::Deque;

use crate::input::SwitchInput;
use crate::machine::{BlinkStep, BootOutcome, SwitchState};
use crate::power::PowerOffPath;
use crate::timer::TimerSlot;

/// Monotonic identifier assigned to each record.
pub type EventId = u32;

pub const TELEMETRY_RING_CAPACITY: usize = 32;

/// How loudly a sink should report an event.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum Severity {
    Debug,
    Info,
    Warn,
}

/// Everything observable about the switch.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SwitchEvent {
    Booted {
        outcome: BootOutcome,
        state: SwitchState,
    },
    Transition {
        from: SwitchState,
        to: SwitchState,
        cause: Option<SwitchInput>,
    },
    InputIgnored {
        state: SwitchState,
        input: SwitchInput,
    },
    StaleTimer {
        state: SwitchState,
        slot: TimerSlot,
    },
    BlinkPhase(BlinkStep),
    BlinkComplete {
        pressed: bool,
    },
    PowerOffRequested(PowerOffPath),
    /// The deferred queue was gone; power-off fell back to the direct path.
    PowerOffQueueLost,
    PowerOffExecuted,
}

impl SwitchEvent {
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            SwitchEvent::InputIgnored { .. }
            | SwitchEvent::StaleTimer { .. }
            | SwitchEvent::BlinkPhase(_) => Severity::Debug,
            SwitchEvent::Booted {
                outcome: BootOutcome::Degraded(_),
                ..
            }
            | SwitchEvent::PowerOffQueueLost => Severity::Warn,
            SwitchEvent::Booted { .. }
            | SwitchEvent::Transition { .. }
            | SwitchEvent::BlinkComplete { .. }
            | SwitchEvent::PowerOffRequested(_)
            | SwitchEvent::PowerOffExecuted => Severity::Info,
        }
    }
}

impl fmt::Display for SwitchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchEvent::Booted { outcome, state } => write!(f, "boot {outcome} -> {state}"),
            SwitchEvent::Transition {
                from,
                to,
                cause: Some(cause),
            } => write!(f, "{from} -> {to} on {cause}"),
            SwitchEvent::Transition {
                from,
                to,
                cause: None,
            } => write!(f, "{from} -> {to}"),
            SwitchEvent::InputIgnored { state, input } => write!(f, "ignored {input} in {state}"),
            SwitchEvent::StaleTimer { state, slot } => {
                write!(f, "stale timer {slot} in {state}")
            }
            SwitchEvent::BlinkPhase(BlinkStep::Lit { remaining }) => {
                write!(f, "blink on ({remaining} left)")
            }
            SwitchEvent::BlinkPhase(BlinkStep::Unlit { remaining }) => {
                write!(f, "blink off ({remaining} left)")
            }
            SwitchEvent::BlinkPhase(BlinkStep::Complete) => f.write_str("blink done"),
            SwitchEvent::BlinkComplete { pressed: true } => {
                f.write_str("blink complete, waiting for release")
            }
            SwitchEvent::BlinkComplete { pressed: false } => f.write_str("blink complete"),
            SwitchEvent::PowerOffRequested(path) => write!(f, "power-off requested ({path})"),
            SwitchEvent::PowerOffQueueLost => {
                f.write_str("power-off queue disconnected, request dropped")
            }
            SwitchEvent::PowerOffExecuted => f.write_str("power-off executed"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TelemetryRecord {
    pub id: EventId,
    pub event: SwitchEvent,
}

impl fmt::Display for TelemetryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.event)
    }
}

/// Bounded record log that evicts the oldest entry when full.
pub struct TelemetryLog<const CAPACITY: usize = TELEMETRY_RING_CAPACITY> {
    ring: Deque<TelemetryRecord, CAPACITY>,
    next_event_id: EventId,
    dropped: u32,
}

impl<const CAPACITY: usize> TelemetryLog<CAPACITY> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: Deque::new(),
            next_event_id: 0,
            dropped: 0,
        }
    }

    /// Appends an event and returns the id it was assigned.
    pub fn record(&mut self, event: SwitchEvent) -> EventId {
        let id = self.next_event_id;
        self.next_event_id = self.next_event_id.wrapping_add(1);

        let record = TelemetryRecord { id, event };
        if let Err(record) = self.ring.push_back(record) {
            self.ring.pop_front();
            self.dropped = self.dropped.saturating_add(1);
            // Room was just made, so this cannot fail.
            let _ = self.ring.push_back(record);
        }
        id
    }

    pub fn oldest_first(&self) -> impl Iterator<Item = &TelemetryRecord> + '_ {
        self.ring.iter()
    }

    pub fn latest(&self) -> Option<&TelemetryRecord> {
        self.ring.back()
    }

    /// Removes and returns the oldest record.
    pub fn pop_oldest(&mut self) -> Option<TelemetryRecord> {
        self.ring.pop_front()
    }

    /// Returns and resets the number of records evicted since the last call.
    pub fn take_dropped(&mut self) -> u32 {
        core::mem::take(&mut self.dropped)
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn clear(&mut self) {
        self.ring.clear();
        self.dropped = 0;
    }
}

impl<const CAPACITY: usize> Default for TelemetryLog<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}
