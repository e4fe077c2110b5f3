use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Level, Output, Pull, Speed};
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::Instant;
use travel_switch_core::{SwitchLevel, TravelSwitch};

use crate::config::SWITCH_CONFIG;
use crate::switch::hw::{LedPin, PowerLatch, SwitchPinReader};
use crate::switch::{DeadlineTimers, EdgeQueue, PowerOffSignal, SignalPowerOffQueue};
use crate::telemetry;

mod input_task;
mod switch_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

pub(super) static EDGES: EdgeQueue = Channel::new();
pub(super) static POWER_OFF: PowerOffSignal = Signal::new();

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let hal::Peripherals {
        PA0, EXTI0, PA5, PB0, ..
    } = hal::init(hal::Config::default());

    // Latch the supply first so releasing the switch does not drop power.
    let power = PowerLatch::new(Output::new(PB0, Level::High, Speed::Low));
    let led = LedPin::new(Output::new(PA5, Level::Low, Speed::Low));
    let input = ExtiInput::new(PA0, EXTI0, Pull::Up);

    let mut switch = TravelSwitch::with_components(
        SWITCH_CONFIG,
        led,
        DeadlineTimers::new(Instant::now()),
        power,
        SignalPowerOffQueue::new(&POWER_OFF),
    );

    if let Err(error) = switch.boot(&mut SwitchPinReader::new(&input)) {
        telemetry::log_init_error(error);
        panic!("switch initialization failed");
    }
    switch.timers_mut().catch_up(Instant::now());
    telemetry::drain(switch.telemetry_mut());

    let initial = SwitchLevel::from_pressed(switch.is_pressed());

    spawner
        .spawn(switch_task::run(switch, EDGES.receiver(), &POWER_OFF))
        .expect("failed to spawn switch task");

    spawner
        .spawn(input_task::run(input, EDGES.sender(), initial))
        .expect("failed to spawn input task");

    core::future::pending::<()>().await;
}
