//! Timer slots and the delayed-task scheduler contract.
//!
//! The switch owns three single-writer slots. Each slot holds at most one
//! pending expiry; arming a slot always follows a cancel of the same slot so a
//! stale expiry can never fire after the state machine has moved on.

use core::fmt;
use core::time::Duration;

/// Named single-owner timer resource.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum TimerSlot {
    Hold,
    Cooldown,
    BlinkStep,
}

impl TimerSlot {
    /// Number of slots the switch uses.
    pub const COUNT: usize = 3;

    /// Every slot, in tie-breaking order.
    pub const ALL: [TimerSlot; Self::COUNT] =
        [TimerSlot::Hold, TimerSlot::Cooldown, TimerSlot::BlinkStep];

    /// Deterministic index for per-slot tables.
    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            TimerSlot::Hold => 0,
            TimerSlot::Cooldown => 1,
            TimerSlot::BlinkStep => 2,
        }
    }

    /// Attempts to construct a [`TimerSlot`] from a raw index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(TimerSlot::Hold),
            1 => Some(TimerSlot::Cooldown),
            2 => Some(TimerSlot::BlinkStep),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            TimerSlot::Hold => "hold",
            TimerSlot::Cooldown => "cooldown",
            TimerSlot::BlinkStep => "blink-step",
        }
    }
}

impl fmt::Display for TimerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Delayed task scheduler driving timer expirations back into the switch.
///
/// Expirations are delivered by the runtime as
/// [`SwitchInput::TimerFired`](crate::input::SwitchInput::TimerFired) on the
/// same serialized context as input events.
pub trait TimerScheduler {
    /// Arms `slot` to fire once after `delay`.
    fn schedule(&mut self, slot: TimerSlot, delay: Duration);

    /// Disarms `slot`. Cancelling a slot that already fired or was never armed
    /// is a no-op.
    fn cancel(&mut self, slot: TimerSlot);
}

impl<T: TimerScheduler + ?Sized> TimerScheduler for &mut T {
    fn schedule(&mut self, slot: TimerSlot, delay: Duration) {
        (**self).schedule(slot, delay);
    }

    fn cancel(&mut self, slot: TimerSlot) {
        (**self).cancel(slot);
    }
}

/// Scheduler that never fires.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopTimers;

impl NoopTimers {
    /// Creates a new no-op scheduler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TimerScheduler for NoopTimers {
    fn schedule(&mut self, _: TimerSlot, _: Duration) {}

    fn cancel(&mut self, _: TimerSlot) {}
}

/// Per-slot deadline table shared by the firmware and virtual-time schedulers.
#[derive(Clone, Debug)]
pub struct DeadlineTable<Instant> {
    deadlines: [Option<Instant>; TimerSlot::COUNT],
}

impl<Instant> DeadlineTable<Instant>
where
    Instant: Copy + Ord,
{
    /// Creates a table with every slot disarmed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            deadlines: [None; TimerSlot::COUNT],
        }
    }

    /// Arms `slot`, replacing any previous deadline.
    pub fn arm(&mut self, slot: TimerSlot, deadline: Instant) {
        self.deadlines[slot.as_index()] = Some(deadline);
    }

    /// Disarms `slot`, returning the deadline it held.
    pub fn disarm(&mut self, slot: TimerSlot) -> Option<Instant> {
        self.deadlines[slot.as_index()].take()
    }

    /// Returns the pending deadline for `slot`, if armed.
    #[must_use]
    pub fn deadline(&self, slot: TimerSlot) -> Option<Instant> {
        self.deadlines[slot.as_index()]
    }

    #[must_use]
    pub fn is_armed(&self, slot: TimerSlot) -> bool {
        self.deadline(slot).is_some()
    }

    /// Earliest armed deadline. Equal deadlines resolve in [`TimerSlot::ALL`] order.
    #[must_use]
    pub fn next_due(&self) -> Option<(TimerSlot, Instant)> {
        TimerSlot::ALL
            .iter()
            .filter_map(|slot| self.deadline(*slot).map(|deadline| (*slot, deadline)))
            .fold(None, |earliest, candidate| match earliest {
                Some((_, current)) if current <= candidate.1 => earliest,
                _ => Some(candidate),
            })
    }

    /// Disarms and returns the earliest slot whose deadline is at or before `now`.
    pub fn pop_expired(&mut self, now: Instant) -> Option<TimerSlot> {
        let (slot, deadline) = self.next_due()?;
        if deadline > now {
            return None;
        }
        self.deadlines[slot.as_index()] = None;
        Some(slot)
    }

    /// Disarms every slot.
    pub fn clear(&mut self) {
        self.deadlines = [None; TimerSlot::COUNT];
    }
}

impl<Instant> Default for DeadlineTable<Instant>
where
    Instant: Copy + Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_indices_round_trip() {
        for slot in TimerSlot::ALL {
            assert_eq!(TimerSlot::from_index(slot.as_index()), Some(slot));
        }
        assert_eq!(TimerSlot::from_index(TimerSlot::COUNT), None);
    }

    #[test]
    fn rearming_replaces_the_previous_deadline() {
        let mut table = DeadlineTable::<u64>::new();
        table.arm(TimerSlot::Hold, 100);
        table.arm(TimerSlot::Hold, 400);

        assert_eq!(table.deadline(TimerSlot::Hold), Some(400));
        assert_eq!(table.pop_expired(100), None);
        assert_eq!(table.pop_expired(400), Some(TimerSlot::Hold));
        assert!(!table.is_armed(TimerSlot::Hold));
    }

    #[test]
    fn next_due_prefers_earliest_then_slot_order() {
        let mut table = DeadlineTable::<u64>::new();
        table.arm(TimerSlot::BlinkStep, 50);
        table.arm(TimerSlot::Cooldown, 50);
        table.arm(TimerSlot::Hold, 75);

        assert_eq!(table.next_due(), Some((TimerSlot::Cooldown, 50)));
        assert_eq!(table.pop_expired(80), Some(TimerSlot::Cooldown));
        assert_eq!(table.pop_expired(80), Some(TimerSlot::BlinkStep));
        assert_eq!(table.pop_expired(80), Some(TimerSlot::Hold));
        assert_eq!(table.pop_expired(80), None);
    }

    #[test]
    fn disarming_an_idle_slot_is_a_no_op() {
        let mut table = DeadlineTable::<u64>::new();
        assert_eq!(table.disarm(TimerSlot::Cooldown), None);
        assert_eq!(table.next_due(), None);
    }
}
