//! Measured quantities and the physical sensors that produce them.
//!
//! ```text
//!  SensorId ──produces──▶ Sample { quantity, value, priority }
//!                                   │
//!                                   ▼
//!                   SubmissionQueue (priority-merge per Quantity)
//!                                   │
//!                                   ▼
//!                            Snapshot fields
//! ```
//!
//! Several physical sensors can report the same [`Quantity`] at different
//! confidence levels (e.g. the SCD41 also estimates temperature and
//! humidity).  The per-quantity priority returned by
//! [`SensorId::priority`] decides which value wins.

use heapless::Vec;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════
//  Quantities
// ═══════════════════════════════════════════════════════════════

/// A logical measured quantity ("sensor kind" from the point of view of
/// the snapshot, the queue and the display).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Quantity {
    Temperature = 0,
    Humidity = 1,
    Pressure = 2,
    Rain = 3,
    Co2 = 4,
    Pm010 = 5,
    Pm025 = 6,
    Pm040 = 7,
    Pm100 = 8,
}

impl Quantity {
    /// Number of distinct quantities; bounds the submission queue.
    pub const COUNT: usize = 9;

    /// Every quantity, in snapshot field order.
    pub const ALL: [Quantity; Self::COUNT] = [
        Self::Temperature,
        Self::Humidity,
        Self::Pressure,
        Self::Rain,
        Self::Co2,
        Self::Pm010,
        Self::Pm025,
        Self::Pm040,
        Self::Pm100,
    ];

    /// Short lowercase key used in logs and the status document.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Temperature => "temp",
            Self::Humidity => "hum",
            Self::Pressure => "press",
            Self::Rain => "raing",
            Self::Co2 => "co2",
            Self::Pm010 => "pm010",
            Self::Pm025 => "pm025",
            Self::Pm040 => "pm040",
            Self::Pm100 => "pm100",
        }
    }

    /// Display unit.
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "\u{00b0}C",
            Self::Humidity => "%",
            Self::Pressure => "hPa",
            Self::Rain => "mm",
            Self::Co2 => "ppm",
            Self::Pm010 | Self::Pm025 | Self::Pm040 | Self::Pm100 => "ug/m3",
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Physical sensors
// ═══════════════════════════════════════════════════════════════

/// Physical sensors the station can be fitted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorId {
    /// Temperature/humidity sensor with an integrated heater.
    Sht4x,
    /// Barometric pressure.
    Lps35hw,
    /// Optical rain gauge (UART).
    Rg15,
    /// Photoacoustic CO2 with low-quality temperature/humidity.
    Scd41,
    /// Particulate matter, four size bins.
    Sen50,
}

/// Priority of a dedicated, calibrated measurement.
pub const PRIORITY_PRIMARY: u8 = 100;
/// Priority of a co-located estimate (e.g. SCD41 self-heating temperature).
pub const PRIORITY_SECONDARY: u8 = 10;

impl SensorId {
    pub const COUNT: usize = 5;

    /// Every sensor, in the order the control loop polls them.
    pub const ALL: [SensorId; Self::COUNT] = [
        Self::Lps35hw,
        Self::Rg15,
        Self::Sht4x,
        Self::Scd41,
        Self::Sen50,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Sht4x => "SHT4x",
            Self::Lps35hw => "LPS35HW",
            Self::Rg15 => "RG15",
            Self::Scd41 => "SCD41",
            Self::Sen50 => "SEN50",
        }
    }

    /// Quantities this sensor reports when its reading is valid.
    pub const fn quantities(self) -> &'static [Quantity] {
        match self {
            Self::Sht4x => &[Quantity::Temperature, Quantity::Humidity],
            Self::Lps35hw => &[Quantity::Pressure],
            Self::Rg15 => &[Quantity::Rain],
            Self::Scd41 => &[Quantity::Co2, Quantity::Temperature, Quantity::Humidity],
            Self::Sen50 => &[
                Quantity::Pm010,
                Quantity::Pm025,
                Quantity::Pm040,
                Quantity::Pm100,
            ],
        }
    }

    pub fn provides(self, quantity: Quantity) -> bool {
        self.quantities().contains(&quantity)
    }

    /// Queue priority of `quantity` when reported by this sensor.
    pub const fn priority(self, quantity: Quantity) -> u8 {
        match (self, quantity) {
            (Self::Scd41, Quantity::Temperature | Quantity::Humidity) => PRIORITY_SECONDARY,
            _ => PRIORITY_PRIMARY,
        }
    }

    /// Whether the sensor element has a heater usable for creep mitigation.
    pub const fn has_heater(self) -> bool {
        matches!(self, Self::Sht4x)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Samples
// ═══════════════════════════════════════════════════════════════

/// One value of one quantity from one sensor read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub quantity: Quantity,
    pub value: f32,
}

/// All samples of a single valid sensor read.  At most four per sensor
/// (SEN50 bins).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Measurement {
    samples: Vec<Sample, 4>,
}

impl Measurement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style push.  Extra samples beyond capacity are dropped.
    #[must_use]
    pub fn with(mut self, quantity: Quantity, value: f32) -> Self {
        let _ = self.samples.push(Sample { quantity, value });
        self
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Value of `quantity` in this read, if present.
    pub fn get(&self, quantity: Quantity) -> Option<f32> {
        self.samples
            .iter()
            .find(|s| s.quantity == quantity)
            .map(|s| s.value)
    }
}
