//! Power-off contracts.
//!
//! Cutting power is only allowed from timer and boot contexts. Requests that
//! originate in the input delivery path go through a [`PowerOffQueue`] and are
//! executed later by the runtime via
//! [`TravelSwitch::run_deferred_power_off`](crate::machine::TravelSwitch::run_deferred_power_off).

use core::fmt;

/// No-argument intent to cut power, carried through the deferred queue.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PowerOffRequest;

/// Execution path chosen for a power-off.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PowerOffPath {
    /// Invoked inline from a timer or boot context.
    Direct,
    /// Submitted to the deferred queue from the input path.
    Deferred,
}

impl PowerOffPath {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            PowerOffPath::Direct => "direct",
            PowerOffPath::Deferred => "deferred",
        }
    }
}

impl fmt::Display for PowerOffPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Irreversibly cuts power to the device.
pub trait PowerControl {
    /// Non-returning on hardware; test doubles return so the caller can observe it.
    fn power_off(&mut self);
}

impl<T: PowerControl + ?Sized> PowerControl for &mut T {
    fn power_off(&mut self) {
        (**self).power_off();
    }
}

/// Power control that performs no hardware interaction.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopPowerControl;

impl NoopPowerControl {
    /// Creates a new no-op power control.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PowerControl for NoopPowerControl {
    fn power_off(&mut self) {}
}

/// Error surfaced when a deferred power-off cannot be submitted.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PowerOffSubmitError {
    /// A request is already waiting to run. Treated as success by the switch.
    AlreadyPending,
    /// The runner draining the queue is gone.
    Disconnected,
}

impl fmt::Display for PowerOffSubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerOffSubmitError::AlreadyPending => f.write_str("power-off already pending"),
            PowerOffSubmitError::Disconnected => f.write_str("power-off runner disconnected"),
        }
    }
}

/// Non-reentrant submission point for deferred power-off requests.
pub trait PowerOffQueue {
    /// Queues `request` without blocking.
    fn submit(&mut self, request: PowerOffRequest) -> Result<(), PowerOffSubmitError>;
}

impl<T: PowerOffQueue + ?Sized> PowerOffQueue for &mut T {
    fn submit(&mut self, request: PowerOffRequest) -> Result<(), PowerOffSubmitError> {
        (**self).submit(request)
    }
}

/// Single-entry queue drained by polling [`PowerOffMailbox::take`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PowerOffMailbox {
    pending: Option<PowerOffRequest>,
}

impl PowerOffMailbox {
    /// Creates an empty mailbox.
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Returns `true` while a request is waiting.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Removes the waiting request, if any.
    pub fn take(&mut self) -> Option<PowerOffRequest> {
        self.pending.take()
    }
}

impl PowerOffQueue for PowerOffMailbox {
    fn submit(&mut self, request: PowerOffRequest) -> Result<(), PowerOffSubmitError> {
        if self.pending.is_some() {
            return Err(PowerOffSubmitError::AlreadyPending);
        }
        self.pending = Some(request);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailbox_holds_a_single_request() {
        let mut mailbox = PowerOffMailbox::new();
        assert_eq!(mailbox.submit(PowerOffRequest), Ok(()));
        assert_eq!(
            mailbox.submit(PowerOffRequest),
            Err(PowerOffSubmitError::AlreadyPending)
        );
        assert!(mailbox.is_pending());

        assert_eq!(mailbox.take(), Some(PowerOffRequest));
        assert_eq!(mailbox.take(), None);
        assert_eq!(mailbox.submit(PowerOffRequest), Ok(()));
    }
}
