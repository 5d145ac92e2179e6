//! Outbound application events.
//!
//! The [`ControlLoop`](super::service::ControlLoop) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, count in tests.

use crate::display::Page;
use crate::error::ReportError;
use crate::heater::HeatReason;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The control loop has started.
    Started { now: i64 },

    /// A measurement cycle completed and the snapshot was published.
    MeasurementCycle(CycleSummary),

    /// A heating sequence was executed.
    HeaterTriggered { reason: HeatReason, wet_count: i32 },

    /// The queued entries were accepted upstream.
    SubmitOk { entries: usize },

    /// The report transport failed.
    SubmitFailed(ReportError),

    /// The wall clock was observed to have jumped backwards.
    ClockAnomaly { jump_secs: i64 },

    /// No successful submit for too long; the device restarts.
    WatchdogRestart { stale_secs: i64 },

    /// The admin surface asked for a restart.
    RestartRequested,

    /// A display page was rendered.
    PageShown(Page),
}

/// Per-cycle numbers worth logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleSummary {
    pub now: i64,
    /// Sensors that delivered a valid result.
    pub sensors_ok: u8,
    /// Sensors that were polled.
    pub sensors_polled: u8,
    /// Entries in the submission queue after merging.
    pub queued: usize,
    pub temperature: f32,
    pub humidity: f32,
}
