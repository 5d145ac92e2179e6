//! System configuration parameters
//!
//! All tunable parameters for the station.
//! Values can be overridden via NVS (non-volatile storage) from the admin
//! surface; defaults match a fully fitted station.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::app::ports::{ConfigError, SensorConfig};
use crate::measurement::SensorId;

/// Which physical sensors are fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorEnables {
    pub sht4x: bool,
    pub lps35hw: bool,
    pub rg15: bool,
    pub scd41: bool,
    pub sen50: bool,
}

impl SensorEnables {
    pub const ALL: Self = Self {
        sht4x: true,
        lps35hw: true,
        rg15: true,
        scd41: true,
        sen50: true,
    };

    pub const NONE: Self = Self {
        sht4x: false,
        lps35hw: false,
        rg15: false,
        scd41: false,
        sen50: false,
    };

    pub fn get(&self, sensor: SensorId) -> bool {
        match sensor {
            SensorId::Sht4x => self.sht4x,
            SensorId::Lps35hw => self.lps35hw,
            SensorId::Rg15 => self.rg15,
            SensorId::Scd41 => self.scd41,
            SensorId::Sen50 => self.sen50,
        }
    }

    pub fn set(&mut self, sensor: SensorId, enabled: bool) {
        match sensor {
            SensorId::Sht4x => self.sht4x = enabled,
            SensorId::Lps35hw => self.lps35hw = enabled,
            SensorId::Rg15 => self.rg15 = enabled,
            SensorId::Scd41 => self.scd41 = enabled,
            SensorId::Sen50 => self.sen50 = enabled,
        }
    }
}

impl Default for SensorEnables {
    fn default() -> Self {
        Self::ALL
    }
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Cadences ---
    /// Seconds between measurement cycles
    pub measurement_interval_secs: u32,
    /// Seconds between display page changes
    pub display_interval_secs: u32,
    /// Sleep between control loop ticks when nothing is due (milliseconds)
    pub idle_tick_ms: u32,

    // --- Sensors ---
    /// Wait between requesting and reading measurements (milliseconds)
    pub sensor_settle_ms: u32,
    /// Wait between consecutive heater pulses (milliseconds)
    pub heater_pulse_settle_ms: u32,
    /// Fitted sensors
    pub sensors: SensorEnables,

    // --- Submission watchdog ---
    /// Boot grace and staleness threshold (seconds)
    pub watchdog_grace_secs: u32,
    /// Staleness above this is a clock jump, not an outage (seconds)
    pub watchdog_sanity_bound_secs: u32,

    // --- Identity / reporting ---
    /// Hostname shown on the identification page
    pub hostname: String<24>,
    /// Upstream measurement endpoint
    pub report_url: String<96>,
    /// Upstream sensor token; empty disables reporting
    pub report_token: String<64>,

    // --- Network ---
    /// WiFi station SSID; empty leaves the radio off
    pub wifi_ssid: String<32>,
    pub wifi_password: String<64>,

    // --- Admin surface ---
    /// Password every admin action must carry
    pub admin_password: String<24>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Cadences
            measurement_interval_secs: 60,
            display_interval_secs: 5,
            idle_tick_ms: 1000,

            // Sensors
            sensor_settle_ms: 1111, // slightly over 1s covers every sensor
            heater_pulse_settle_ms: 1500,
            sensors: SensorEnables::ALL,

            // Watchdog
            watchdog_grace_secs: 900,           // 15 min
            watchdog_sanity_bound_secs: 100_000, // ~28 h

            // Identity
            hostname: String::try_from("envstation").unwrap_or_default(),
            report_url: String::try_from("https://wetter.poempelfox.de/api/pushmeasurement/")
                .unwrap_or_default(),
            report_token: String::new(),

            // Network
            wifi_ssid: String::new(),
            wifi_password: String::new(),

            // Admin
            admin_password: String::try_from("admin").unwrap_or_default(),
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Called before persisting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(10..=3600).contains(&self.measurement_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "measurement_interval_secs must be 10–3600",
            ));
        }
        if !(1..=600).contains(&self.display_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "display_interval_secs must be 1–600",
            ));
        }
        if !(100..=5000).contains(&self.idle_tick_ms) {
            return Err(ConfigError::ValidationFailed("idle_tick_ms must be 100–5000"));
        }
        if self.sensor_settle_ms > 10_000 {
            return Err(ConfigError::ValidationFailed(
                "sensor_settle_ms must be 0–10000",
            ));
        }
        if self.heater_pulse_settle_ms > 10_000 {
            return Err(ConfigError::ValidationFailed(
                "heater_pulse_settle_ms must be 0–10000",
            ));
        }
        if self.watchdog_grace_secs < 2 * self.measurement_interval_secs {
            return Err(ConfigError::ValidationFailed(
                "watchdog_grace_secs must cover at least two measurement cycles",
            ));
        }
        if self.watchdog_sanity_bound_secs <= self.watchdog_grace_secs {
            return Err(ConfigError::ValidationFailed(
                "watchdog_sanity_bound_secs must exceed watchdog_grace_secs",
            ));
        }
        if self.hostname.is_empty() {
            return Err(ConfigError::ValidationFailed("hostname must not be empty"));
        }
        if !self.wifi_password.is_empty() && self.wifi_password.len() < 8 {
            return Err(ConfigError::ValidationFailed(
                "wifi_password must be empty or at least 8 bytes",
            ));
        }
        if self.admin_password.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "admin_password must not be empty",
            ));
        }
        Ok(())
    }
}

impl SensorConfig for SystemConfig {
    fn sensor_enabled(&self, sensor: SensorId) -> bool {
        self.sensors.get(sensor)
    }
}
