use core::time::Duration;

use travel_switch_core::sim::{BootScenario, LedEdge, Simulator};
use travel_switch_core::telemetry::SwitchEvent;
use travel_switch_core::{PowerOffPath, SwitchConfig, SwitchState, TimerSlot};

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn idle_simulator(config: SwitchConfig) -> Simulator {
    let mut sim = Simulator::new(config);
    sim.boot(BootScenario::Unreadable)
        .expect("degraded boot still succeeds");
    assert_eq!(sim.state(), SwitchState::Idle);
    sim
}

fn edges(sim: &Simulator) -> Vec<LedEdge> {
    sim.led_edges().copied().collect()
}

fn edge(at: u64, on: bool) -> LedEdge {
    LedEdge { at: ms(at), on }
}

#[test]
fn hold_then_early_release_powers_off_after_the_blink_sequence() {
    let mut sim = idle_simulator(SwitchConfig::default());

    sim.press();
    assert_eq!(sim.state(), SwitchState::HoldPending);
    assert!(sim.led_level());

    sim.advance_to(ms(1_000));
    assert_eq!(sim.state(), SwitchState::BlinkSequence);
    assert!(!sim.led_level());

    sim.advance_to(ms(1_050));
    sim.release();
    assert_eq!(
        sim.state(),
        SwitchState::BlinkSequence,
        "release mid-sequence must not abort the blink"
    );

    sim.advance_to(ms(1_699));
    assert_eq!(sim.power_off_count(), 0);

    sim.advance_to(ms(1_700));
    assert_eq!(sim.state(), SwitchState::ShuttingDown);
    assert_eq!(sim.power_off_at(), Some(ms(1_700)));
    assert_eq!(sim.power_off_count(), 1);
    assert_eq!(
        sim.switch().power_off_path(),
        Some(PowerOffPath::Direct)
    );
}

#[test]
fn holding_past_the_sequence_waits_for_release() {
    let mut sim = idle_simulator(SwitchConfig::default());

    sim.press();
    sim.advance_to(ms(2_500));
    assert_eq!(sim.state(), SwitchState::BlinkSequence);
    assert!(sim.switch().blink_progress().is_complete());
    assert_eq!(sim.power_off_count(), 0);

    sim.release();
    assert_eq!(sim.state(), SwitchState::ShuttingDown);
    assert_eq!(sim.power_off_at(), Some(ms(2_500)));
    assert_eq!(
        sim.switch().power_off_path(),
        Some(PowerOffPath::Deferred)
    );
    assert!(
        sim.journal()
            .any(|entry| entry.record.event == SwitchEvent::PowerOffExecuted)
    );
}

#[test]
fn release_after_last_pulse_but_before_completion_powers_off_immediately() {
    let mut sim = idle_simulator(SwitchConfig::default());

    sim.press();
    sim.advance_to(ms(1_650));
    assert_eq!(sim.switch().blink_progress().remaining(), 0);

    sim.release();
    assert_eq!(sim.state(), SwitchState::ShuttingDown);
    assert_eq!(sim.power_off_at(), Some(ms(1_650)));
    assert!(!sim.is_armed(TimerSlot::BlinkStep));

    sim.advance_to(ms(3_000));
    assert_eq!(sim.power_off_count(), 1);
}

#[test]
fn short_press_keeps_led_lit_through_cooldown() {
    let mut sim = idle_simulator(SwitchConfig::default());

    sim.press();
    sim.advance_to(ms(400));
    sim.release();
    assert_eq!(sim.state(), SwitchState::LedCooldown);
    assert!(sim.led_level());

    sim.advance_to(ms(899));
    assert!(sim.led_level());

    sim.advance_to(ms(900));
    assert_eq!(sim.state(), SwitchState::Idle);
    assert_eq!(edges(&sim), vec![edge(0, true), edge(900, false)]);
    assert_eq!(sim.power_off_count(), 0);
}

#[test]
fn repress_during_cooldown_restarts_the_full_hold() {
    let mut sim = idle_simulator(SwitchConfig::default());

    sim.press();
    sim.advance_to(ms(400));
    sim.release();
    sim.advance_to(ms(600));
    sim.press();
    assert_eq!(sim.state(), SwitchState::HoldPending);
    assert!(!sim.is_armed(TimerSlot::Cooldown));

    sim.advance_to(ms(1_599));
    assert_eq!(sim.state(), SwitchState::HoldPending);
    assert!(sim.led_level(), "cooldown must not turn the LED off");

    sim.advance_to(ms(1_600));
    assert_eq!(sim.state(), SwitchState::BlinkSequence);
    assert_eq!(edges(&sim), vec![edge(0, true), edge(1_600, false)]);
}

#[test]
fn stale_hold_expiry_is_ignored_after_release() {
    let mut sim = idle_simulator(SwitchConfig::default());

    sim.press();
    sim.advance_to(ms(300));
    sim.release();
    assert!(!sim.is_armed(TimerSlot::Hold));

    sim.advance_to(ms(1_200));
    assert_eq!(sim.state(), SwitchState::Idle);
    assert!(
        !sim.journal()
            .any(|entry| matches!(entry.record.event, SwitchEvent::BlinkPhase(_)))
    );
}

#[test]
fn zero_blink_count_completes_without_pulses() {
    let mut sim = idle_simulator(SwitchConfig::from_millis(1_000, 500, 0, 200));

    sim.press();
    sim.advance_to(ms(1_000));
    assert_eq!(sim.state(), SwitchState::BlinkSequence);
    assert!(sim.switch().blink_progress().is_complete());

    sim.advance_to(ms(1_100));
    assert_eq!(sim.power_off_count(), 0, "still held at the completion step");

    sim.release();
    assert_eq!(sim.power_off_at(), Some(ms(1_100)));
    assert_eq!(edges(&sim), vec![edge(0, true), edge(1_000, false)]);
}

#[test]
fn power_off_is_requested_exactly_once() {
    let mut sim = idle_simulator(SwitchConfig::default());

    sim.press();
    sim.advance_to(ms(2_000));
    sim.release();
    assert_eq!(sim.power_off_count(), 1);

    sim.press();
    sim.release();
    sim.advance(ms(5_000));
    sim.hold_for(ms(3_000));

    assert_eq!(sim.state(), SwitchState::ShuttingDown);
    assert_eq!(sim.power_off_count(), 1);
    let requests = sim
        .journal()
        .filter(|entry| matches!(entry.record.event, SwitchEvent::PowerOffRequested(_)))
        .count();
    assert_eq!(requests, 1);
}

#[test]
fn repeated_edges_in_the_same_state_are_ignored() {
    let mut sim = idle_simulator(SwitchConfig::default());

    sim.release();
    assert_eq!(sim.state(), SwitchState::Idle);

    sim.press();
    sim.advance_to(ms(500));
    sim.press();
    sim.advance_to(ms(1_000));
    assert_eq!(
        sim.state(),
        SwitchState::BlinkSequence,
        "a duplicate press must not restart the hold timer"
    );
}
