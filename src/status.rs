//! State shared with the status surface, and the document it serves.
//!
//! ```text
//!   control task ──write──▶ SharedState ◀──read── status / admin task
//!                           ├ snapshots  (double-buffered readings)
//!                           └ admin      (advisory flags, counters)
//! ```

use serde::Serialize;

use crate::app::commands::AdminFlags;
use crate::snapshot::{CO2_ABSENT, Snapshot, SnapshotStore};

/// Everything other tasks may touch.  Lives in an `Arc` (or a `static`).
#[derive(Default)]
pub struct SharedState {
    pub snapshots: SnapshotStore,
    pub admin: AdminFlags,
}

impl SharedState {
    pub const fn new() -> Self {
        Self {
            snapshots: SnapshotStore::new(),
            admin: AdminFlags::new(),
        }
    }
}

/// Latest readings; absent values serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Readings {
    pub temp: Option<f32>,
    pub hum: Option<f32>,
    pub press: Option<f32>,
    pub raing: Option<f32>,
    pub co2: Option<u16>,
    pub pm010: Option<f32>,
    pub pm025: Option<f32>,
    pub pm040: Option<f32>,
    pub pm100: Option<f32>,
}

impl From<&Snapshot> for Readings {
    fn from(s: &Snapshot) -> Self {
        let finite = |v: f32| (!v.is_nan()).then_some(v);
        Self {
            temp: finite(s.temperature),
            hum: finite(s.humidity),
            press: finite(s.pressure),
            raing: finite(s.rain),
            co2: (s.co2 != CO2_ABSENT).then_some(s.co2),
            pm010: finite(s.pm010),
            pm025: finite(s.pm025),
            pm040: finite(s.pm040),
            pm100: finite(s.pm100),
        }
    }
}

/// The status document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub version: &'static str,
    pub last_update: i64,
    pub last_heater: i64,
    pub readings: Readings,
    pub too_wet_count: i32,
    pub pending_fw_verify: bool,
}

impl StatusReport {
    /// Take a consistent view of the shared state.
    pub fn capture(shared: &SharedState) -> Self {
        let snap = shared.snapshots.current();
        Self {
            version: env!("CARGO_PKG_VERSION"),
            last_update: snap.last_update,
            last_heater: snap.last_heater,
            readings: Readings::from(&snap),
            too_wet_count: shared.admin.wet_count(),
            pending_fw_verify: shared.admin.pending_fw_verify(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
