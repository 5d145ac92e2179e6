//! Hardware adapter: bridges the sensor hub to domain port traits.
//!
//! Owns the [`SensorHub`] and the board delay, exposing them through
//! [`SensorPort`], [`HeaterPort`] and [`DelayNs`].  This is the only
//! module in the system that touches the sensor buses.  On non-espidf
//! targets the hub holds simulated drivers.

use embedded_hal::delay::DelayNs;
use log::warn;

use crate::app::ports::{HeaterPort, SensorPort};
use crate::measurement::{Measurement, SensorId};
use crate::sensors::SensorHub;

/// Concrete adapter that combines the sensor buses behind port traits.
pub struct HardwareAdapter<D> {
    sensor_hub: SensorHub,
    delay: D,
    heater_pulses: u32,
}

impl<D: DelayNs> HardwareAdapter<D> {
    pub fn new(sensor_hub: SensorHub, delay: D) -> Self {
        Self {
            sensor_hub,
            delay,
            heater_pulses: 0,
        }
    }

    /// Heater pulses fired since boot.
    pub fn heater_pulses(&self) -> u32 {
        self.heater_pulses
    }

    pub fn sensor_hub(&self) -> &SensorHub {
        &self.sensor_hub
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<D: DelayNs> SensorPort for HardwareAdapter<D> {
    fn request_measurement(&mut self, sensor: SensorId) {
        self.sensor_hub.request(sensor);
    }

    fn read_result(&mut self, sensor: SensorId) -> Option<Measurement> {
        self.sensor_hub.read(sensor)
    }
}

// ── HeaterPort implementation ─────────────────────────────────

impl<D: DelayNs> HeaterPort for HardwareAdapter<D> {
    fn pulse_heater(&mut self) {
        match self.sensor_hub.pulse_heater() {
            Ok(()) => self.heater_pulses = self.heater_pulses.wrapping_add(1),
            Err(e) => warn!("heater pulse failed: {}", e),
        }
    }
}

// ── DelayNs implementation ────────────────────────────────────

impl<D: DelayNs> DelayNs for HardwareAdapter<D> {
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
