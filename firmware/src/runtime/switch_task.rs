use embassy_futures::select::{Either3, select3};
use embassy_time::{Instant, Timer};
use travel_switch_core::{SwitchInput, TravelSwitch};

use crate::switch::hw::{LedPin, PowerLatch};
use crate::switch::{DeadlineTimers, EdgeReceiver, PowerOffSignal, SignalPowerOffQueue};
use crate::telemetry;

pub type FirmwareSwitch = TravelSwitch<
    LedPin<'static>,
    DeadlineTimers,
    PowerLatch<'static>,
    SignalPowerOffQueue<'static>,
>;

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => Timer::at(at).await,
        None => core::future::pending::<()>().await,
    }
}

/// Owns the switch and serializes every input, expiration and deferred
/// power-off through one loop.
#[embassy_executor::task]
pub async fn run(
    mut switch: FirmwareSwitch,
    edges: EdgeReceiver<'static>,
    power_off: &'static PowerOffSignal,
) -> ! {
    loop {
        let deadline = switch.timers().next_deadline();

        match select3(edges.receive(), sleep_until(deadline), power_off.wait()).await {
            Either3::First(event) => {
                if let Some(input) = SwitchInput::from_input_event(&event) {
                    switch.timers_mut().set_now(Instant::now());
                    switch.handle(input);
                }
            }
            Either3::Second(()) => {
                let now = Instant::now();
                while let Some(slot) = switch.timers_mut().pop_due(now) {
                    switch.on_timer(slot);
                }
            }
            Either3::Third(request) => switch.run_deferred_power_off(request),
        }

        telemetry::drain(switch.telemetry_mut());
    }
}
