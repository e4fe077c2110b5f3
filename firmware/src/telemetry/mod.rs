//! Logging sink for switch telemetry.
//!
//! The switch task drains the core [`TelemetryLog`] after every dispatch and
//! forwards each record to defmt on target or stdout on host builds.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use travel_switch_core::telemetry::{Severity, TelemetryLog, TelemetryRecord};
use travel_switch_core::InitError;

/// Emits every pending record, oldest first. Returns how many were emitted.
pub fn drain(log: &mut TelemetryLog) -> usize {
    let dropped = log.take_dropped();
    if dropped > 0 {
        emit_dropped(dropped);
    }

    let mut emitted = 0;
    while let Some(record) = log.pop_oldest() {
        emit_record(&record);
        emitted += 1;
    }
    emitted
}

pub fn log_init_error(error: InitError) {
    emit_init_error(error);
}

#[cfg(target_os = "none")]
fn emit_record(record: &TelemetryRecord) {
    let event = defmt::Display2Format(&record.event);
    match record.event.severity() {
        Severity::Debug => defmt::debug!("switch #{} {}", record.id, event),
        Severity::Info => defmt::info!("switch #{} {}", record.id, event),
        Severity::Warn => defmt::warn!("switch #{} {}", record.id, event),
    }
}

#[cfg(not(target_os = "none"))]
fn emit_record(record: &TelemetryRecord) {
    let level = match record.event.severity() {
        Severity::Debug => "debug",
        Severity::Info => "info",
        Severity::Warn => "warn",
    };
    println!("{level}: switch #{} {}", record.id, record.event);
}

#[cfg(target_os = "none")]
fn emit_dropped(count: u32) {
    defmt::warn!("switch: {} telemetry records dropped", count);
}

#[cfg(not(target_os = "none"))]
fn emit_dropped(count: u32) {
    println!("warn: switch: {count} telemetry records dropped");
}

#[cfg(target_os = "none")]
fn emit_init_error(error: InitError) {
    defmt::error!("boot: {}", defmt::Display2Format(&error));
}

#[cfg(not(target_os = "none"))]
fn emit_init_error(error: InitError) {
    println!("error: boot: {error}");
}
