use core::time::Duration;

use travel_switch_core::sim::{BootScenario, RecordingLed, ScriptedLevel, Simulator};
use travel_switch_core::telemetry::SwitchEvent;
use travel_switch_core::{
    BootOutcome, BootReadFault, BootSamplePolicy, InitError, LedFault, PowerOffPath,
    SwitchConfig, SwitchLevel, SwitchState, TimerSlot,
};

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[test]
fn held_at_boot_then_released_early_powers_off() {
    let mut sim = Simulator::new(SwitchConfig::default());

    let outcome = sim.boot(BootScenario::Held).expect("boot failed");
    assert_eq!(outcome, BootOutcome::WakeValidation);
    assert_eq!(sim.state(), SwitchState::WakeupHoldPending);
    assert!(sim.led_level());
    assert!(sim.switch().is_pressed());

    sim.advance_to(ms(300));
    sim.release();

    assert_eq!(sim.state(), SwitchState::ShuttingDown);
    assert!(!sim.led_level());
    assert!(!sim.is_armed(TimerSlot::Hold));
    assert_eq!(sim.power_off_at(), Some(ms(300)));
    assert_eq!(
        sim.switch().power_off_path(),
        Some(PowerOffPath::Deferred)
    );
}

#[test]
fn held_through_wake_validation_runs_the_normal_sequence() {
    let mut sim = Simulator::new(SwitchConfig::default());
    sim.boot(BootScenario::Held).expect("boot failed");

    sim.advance_to(ms(1_000));
    assert_eq!(sim.state(), SwitchState::BlinkSequence);

    sim.advance_to(ms(1_200));
    sim.release();
    assert_eq!(sim.state(), SwitchState::BlinkSequence);

    sim.advance_to(ms(1_700));
    assert_eq!(sim.power_off_at(), Some(ms(1_700)));
    assert_eq!(sim.power_off_count(), 1);
}

#[test]
fn released_at_boot_is_a_spurious_wake() {
    let mut sim = Simulator::new(SwitchConfig::default());

    let outcome = sim.boot(BootScenario::Released).expect("boot failed");
    assert_eq!(outcome, BootOutcome::Spurious);
    assert_eq!(sim.state(), SwitchState::ShuttingDown);
    assert_eq!(sim.power_off_at(), Some(Duration::ZERO));
    assert_eq!(
        sim.switch().power_off_path(),
        Some(PowerOffPath::Direct)
    );
    assert!(
        !sim.journal()
            .any(|entry| matches!(entry.record.event, SwitchEvent::Transition { .. })),
        "a spurious wake never passes through idle"
    );

    sim.press();
    sim.advance(ms(5_000));
    sim.release();
    assert_eq!(sim.power_off_count(), 1);
}

#[test]
fn unreadable_level_degrades_to_idle_and_keeps_working() {
    let mut sim = Simulator::new(SwitchConfig::default());

    let outcome = sim.boot(BootScenario::Unreadable).expect("boot failed");
    assert_eq!(outcome, BootOutcome::Degraded(BootReadFault::ReadFailed));
    assert_eq!(sim.state(), SwitchState::Idle);
    assert_eq!(sim.power_off_count(), 0);

    sim.hold_for(ms(200));
    assert_eq!(sim.state(), SwitchState::LedCooldown);
}

#[test]
fn confirmed_policy_treats_a_bounce_as_released() {
    let config = SwitchConfig::default().with_boot_policy(BootSamplePolicy::Confirmed {
        samples: 3,
        spacing: ms(5),
    });
    let mut sim = Simulator::new(config);
    let mut reader = ScriptedLevel::sequence(&[
        Ok(SwitchLevel::Pressed),
        Ok(SwitchLevel::Pressed),
        Ok(SwitchLevel::Released),
    ]);

    let outcome = sim.boot_with(&mut reader).expect("boot failed");
    assert_eq!(outcome, BootOutcome::Spurious);
    assert_eq!(reader.reads(), 3);
    assert_eq!(sim.power_off_at(), Some(ms(10)));
}

#[test]
fn confirmed_policy_arms_the_hold_after_sampling() {
    let config = SwitchConfig::default().with_boot_policy(BootSamplePolicy::Confirmed {
        samples: 3,
        spacing: ms(5),
    });
    let mut sim = Simulator::new(config);

    let outcome = sim.boot(BootScenario::Held).expect("boot failed");
    assert_eq!(outcome, BootOutcome::WakeValidation);
    assert_eq!(sim.now(), ms(10));
    assert_eq!(
        sim.switch().timers().deadline(TimerSlot::Hold),
        Some(ms(1_010))
    );
}

#[test]
fn led_fault_aborts_boot() {
    let mut sim = Simulator::with_led(
        SwitchConfig::default(),
        RecordingLed::failing(LedFault::ConfigureFailed),
    );

    assert_eq!(
        sim.boot(BootScenario::Held),
        Err(InitError::Led(LedFault::ConfigureFailed))
    );
    assert!(!sim.switch().is_booted());

    sim.press();
    assert_eq!(sim.state(), SwitchState::Idle);
    assert!(!sim.led_level());
}

#[test]
fn booting_twice_is_rejected() {
    let mut sim = Simulator::new(SwitchConfig::default());
    sim.boot(BootScenario::Unreadable).expect("boot failed");

    assert_eq!(sim.boot(BootScenario::Held), Err(InitError::AlreadyBooted));
    assert_eq!(sim.state(), SwitchState::Idle);
}

#[test]
fn events_before_boot_are_dropped() {
    let mut sim = Simulator::new(SwitchConfig::default());

    sim.press();
    sim.advance(ms(2_000));
    assert_eq!(sim.state(), SwitchState::Idle);
    assert!(!sim.led_level());
    assert!(
        sim.journal()
            .all(|entry| matches!(entry.record.event, SwitchEvent::InputIgnored { .. }))
    );
}
