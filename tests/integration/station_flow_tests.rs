//! End-to-end station cycles through the real hardware adapter, sensor
//! hub and simulated drivers.

use std::sync::atomic::Ordering;

use envstation::adapters::report_http::HttpReporter;
use envstation::app::commands::AdminCommand;
use envstation::app::service::{CycleOutcome, RestartReason};
use envstation::config::SystemConfig;
use envstation::display::Page;
use envstation::error::SensorError;
use envstation::measurement::{Quantity, SensorId};
use envstation::sensors::sim::SimulatedSensor;
use envstation::status::StatusReport;

use crate::support::{AcceptingReporter, BenchStation, T0, sht4x};

fn healthy_station() -> BenchStation {
    BenchStation::new(
        SystemConfig::default(),
        SimulatedSensor::constant(SensorId::Sht4x, sht4x(21.5, 45.0)),
    )
}

#[test]
fn full_cycle_reports_every_available_quantity() {
    let mut st = healthy_station();
    let mut report = AcceptingReporter::default();

    let outcome = st.tick(T0 + 60, &mut report);
    assert_eq!(outcome, CycleOutcome::Measured { submitted: true });

    // Rain gauge is enabled but has no driver, so eight quantities remain.
    assert_eq!(report.reports.len(), 1);
    let sent = &report.reports[0];
    assert_eq!(sent.len(), 8);
    assert!(sent.iter().all(|e| e.quantity != Quantity::Rain));

    // SHT4x wins temperature and humidity over the SCD41.
    assert_eq!(st.control.queue().get(Quantity::Temperature), Some(21.5));
    assert_eq!(st.control.queue().get(Quantity::Humidity), Some(45.0));
    assert_eq!(st.control.queue().get(Quantity::Co2), Some(812.0));

    // The settle wait went through the board delay.
    assert!(st.hw.sensor_hub().has(SensorId::Sen50));
    assert_eq!(st.delayed_ms(), 1111);
}

#[test]
fn status_document_reflects_published_cycle() {
    let mut st = healthy_station();
    let mut report = AcceptingReporter::default();
    st.tick(T0 + 60, &mut report);

    let status = StatusReport::capture(&st.shared);
    assert_eq!(status.last_update, T0 + 60);
    assert_eq!(status.readings.press, Some(1002.5));
    assert_eq!(status.readings.co2, Some(812));
    assert_eq!(status.readings.raing, None);

    let json = status.to_json().unwrap();
    assert!(json.contains("\"raing\":null"));
    assert!(json.contains("\"too_wet_count\":0"));
}

#[test]
fn failed_primary_sensor_falls_back_to_scd41() {
    let sht = SimulatedSensor::scripted(SensorId::Sht4x)
        .then(Ok(sht4x(19.0, 50.0)))
        .then(Err(SensorError::Checksum));
    let mut st = BenchStation::new(SystemConfig::default(), sht);
    let mut report = AcceptingReporter::default();

    st.tick(T0 + 60, &mut report);
    assert_eq!(st.control.queue().get(Quantity::Temperature), Some(19.0));

    st.tick(T0 + 120, &mut report);
    assert_eq!(st.control.queue().get(Quantity::Temperature), Some(24.1));
    assert_eq!(st.shared.snapshots.current().get(Quantity::Humidity), Some(38.0));
}

#[test]
fn long_saturation_triggers_creep_heating() {
    let mut sht = SimulatedSensor::scripted(SensorId::Sht4x);
    for _ in 0..61 {
        sht = sht.then(Ok(sht4x(12.0, 95.0)));
    }
    sht = sht.then(Ok(sht4x(12.0, 60.0)));
    let mut st = BenchStation::new(SystemConfig::default(), sht);
    let mut report = AcceptingReporter::default();

    for k in 1..=61 {
        st.tick(T0 + 60 * k, &mut report);
    }
    assert_eq!(st.control.heater().wet_count(), 61);
    assert_eq!(st.heat_pulses.load(Ordering::Relaxed), 0);

    st.tick(T0 + 60 * 62, &mut report);
    assert_eq!(st.heat_pulses.load(Ordering::Relaxed), 3);
    assert_eq!(st.hw.heater_pulses(), 3);
    assert_eq!(st.control.heater().wet_count(), 31);
    assert_eq!(st.shared.admin.wet_count(), 31);
}

#[test]
fn forced_heating_reaches_the_sensor() {
    let mut st = healthy_station();
    let mut report = AcceptingReporter::default();
    st.shared.admin.apply(AdminCommand::ForceHeater).unwrap();

    st.tick(T0 + 60, &mut report);
    assert_eq!(st.heat_pulses.load(Ordering::Relaxed), 3);
    assert!(!st.shared.admin.force_heater());
}

#[test]
fn host_reporter_without_token_ends_in_watchdog_restart() {
    let mut st = healthy_station();
    let mut reporter = HttpReporter::new(&SystemConfig::default());

    let mut restart = None;
    for k in 1..=20 {
        if let CycleOutcome::Restart(reason) = st.tick(T0 + 60 * k, &mut reporter) {
            restart = Some((k, reason));
            break;
        }
    }
    assert_eq!(
        restart,
        Some((16, RestartReason::SubmitStale { stale_secs: 960 }))
    );
    assert_eq!(reporter.reports_sent(), 0);
}

#[test]
fn display_pages_render_between_measurements() {
    let mut st = healthy_station();
    let mut report = AcceptingReporter::default();
    st.tick(T0 + 60, &mut report);

    for s in 1..=4 {
        let outcome = st.tick(T0 + 60 + 5 * s, &mut report);
        assert!(matches!(outcome, CycleOutcome::Displayed(_)));
    }
    assert_eq!(st.display.renders(), 4);
    assert!(matches!(st.display.last_page(), Some(Page::Data(_))));
}
