//! Shared fixtures: a station wired with real adapters around
//! simulated sensor drivers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use embedded_hal::delay::DelayNs;
use envstation::adapters::hardware::HardwareAdapter;
use envstation::adapters::log_display::LogDisplay;
use envstation::adapters::log_sink::LogEventSink;
use envstation::app::ports::ReportPort;
use envstation::app::service::{ControlLoop, CycleOutcome};
use envstation::config::SystemConfig;
use envstation::error::ReportError;
use envstation::measurement::{Measurement, Quantity, SensorId};
use envstation::queue::QueueEntry;
use envstation::sensors::SensorHub;
use envstation::sensors::sim::SimulatedSensor;
use envstation::status::SharedState;

pub const T0: i64 = 1_700_000_000;

/// Delay that returns immediately and remembers the total requested.
#[derive(Clone, Default)]
pub struct InstantDelay {
    total_ns: Arc<AtomicU64>,
}

impl DelayNs for InstantDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns.fetch_add(u64::from(ns), Ordering::Relaxed);
    }
}

/// Report transport that accepts everything and keeps the payloads.
#[derive(Default)]
pub struct AcceptingReporter {
    pub reports: Vec<Vec<QueueEntry>>,
}

impl ReportPort for AcceptingReporter {
    fn flush(&mut self, entries: &[QueueEntry]) -> Result<(), ReportError> {
        self.reports.push(entries.to_vec());
        Ok(())
    }
}

pub struct BenchStation {
    pub control: ControlLoop,
    pub shared: Arc<SharedState>,
    pub hw: HardwareAdapter<InstantDelay>,
    pub display: LogDisplay,
    pub sink: LogEventSink,
    pub heat_pulses: Arc<AtomicU32>,
    delay: InstantDelay,
}

impl BenchStation {
    /// A fully fitted station with plausible indoor readings.
    pub fn new(config: SystemConfig, sht4x: SimulatedSensor) -> Self {
        let heat_pulses = sht4x.heat_counter();
        let mut hub = SensorHub::new();
        hub.register(Box::new(sht4x));
        hub.register(Box::new(SimulatedSensor::constant(
            SensorId::Lps35hw,
            Measurement::new().with(Quantity::Pressure, 1002.5),
        )));
        hub.register(Box::new(SimulatedSensor::constant(
            SensorId::Scd41,
            Measurement::new()
                .with(Quantity::Co2, 812.0)
                .with(Quantity::Temperature, 24.1)
                .with(Quantity::Humidity, 38.0),
        )));
        hub.register(Box::new(SimulatedSensor::constant(
            SensorId::Sen50,
            Measurement::new()
                .with(Quantity::Pm010, 3.1)
                .with(Quantity::Pm025, 4.4)
                .with(Quantity::Pm040, 5.0)
                .with(Quantity::Pm100, 5.3),
        )));

        let shared = Arc::new(SharedState::new());
        let mut sink = LogEventSink::new();
        let mut control = ControlLoop::new(config, Arc::clone(&shared), T0);
        control.start(T0, &mut sink);

        let delay = InstantDelay::default();
        Self {
            control,
            shared,
            hw: HardwareAdapter::new(hub, delay.clone()),
            display: LogDisplay::new(),
            sink,
            heat_pulses,
            delay,
        }
    }

    /// Milliseconds the station has spent waiting on the board delay.
    pub fn delayed_ms(&self) -> u64 {
        self.delay.total_ns.load(Ordering::Relaxed) / 1_000_000
    }

    pub fn tick(&mut self, now: i64, report: &mut impl ReportPort) -> CycleOutcome {
        let uptime = u64::try_from(now - T0).unwrap_or(0);
        self.control
            .tick(now, uptime, &mut self.hw, &mut self.display, report, &mut self.sink)
    }
}

pub fn sht4x(temp: f32, hum: f32) -> Measurement {
    Measurement::new()
        .with(Quantity::Temperature, temp)
        .with(Quantity::Humidity, hum)
}
