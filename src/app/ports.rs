//! Port traits: the hexagonal boundary between the control loop and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! Driven adapters (sensor drivers, heater, report transport, display,
//! storage, restart) implement these traits.  The
//! [`ControlLoop`](super::service::ControlLoop) consumes them via generics,
//! so the domain core never touches hardware or the network directly.
//!
//! Failures never cross these traits as panics: sensors answer `None`,
//! the report transport answers a typed [`ReportError`].

use crate::config::SystemConfig;
use crate::display::PageView;
use crate::error::ReportError;
use crate::measurement::{Measurement, Quantity, SensorId};
use crate::queue::QueueEntry;
use crate::snapshot::Snapshot;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port over the physical sensors.
///
/// A measurement is split in two phases so that every sensor can convert
/// in parallel during one shared settle delay.
pub trait SensorPort {
    /// Fire-and-forget: start a conversion on `sensor`.
    fn request_measurement(&mut self, sensor: SensorId);

    /// Fetch the conversion result.  `None` means no valid data this
    /// cycle (bus error, checksum, not fitted); the core leaves the
    /// corresponding fields absent.
    fn read_result(&mut self, sensor: SensorId) -> Option<Measurement>;
}

// ───────────────────────────────────────────────────────────────
// Heater port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// The heater built into the humidity sensor.
pub trait HeaterPort {
    /// Fire one heater pulse.  The adapter owns pulse power and duration.
    fn pulse_heater(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Report port (driven adapter: domain → upstream)
// ───────────────────────────────────────────────────────────────

/// Upstream reporting transport.
pub trait ReportPort {
    /// Submit every queued entry in one report.
    fn flush(&mut self, entries: &[QueueEntry]) -> Result<(), ReportError>;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → panel)
// ───────────────────────────────────────────────────────────────

/// Renders one fully derived page.  Fonts, pixels and the panel wire
/// protocol live behind this trait.
pub trait DisplayPort {
    fn render(&mut self, view: &PageView, snapshot: &Snapshot);
}

// ───────────────────────────────────────────────────────────────
// Configuration source (read-only facts)
// ───────────────────────────────────────────────────────────────

/// Which sensors are fitted.  Consumed by the measurement cycle and by
/// the display when it recomputes its enabled pages.
pub trait SensorConfig {
    fn sensor_enabled(&self, sensor: SensorId) -> bool;

    /// True if at least one fitted sensor provides `quantity`.
    fn quantity_available(&self, quantity: Quantity) -> bool {
        SensorId::ALL
            .iter()
            .any(|s| self.sensor_enabled(*s) && s.provides(quantity))
    }
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Two notions of time: wall-clock seconds (may jump after NTP sync) and
/// monotonic uptime.
pub trait ClockPort {
    /// Seconds since the Unix epoch.
    fn now_secs(&self) -> i64;

    /// Seconds since boot.
    fn uptime_secs(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Restart primitive
// ───────────────────────────────────────────────────────────────

pub trait RestartPort {
    /// Reboot the device.  Does not return.
    fn restart_device(&mut self) -> !;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
