//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::MeasurementCycle(c) => {
                info!(
                    "MEAS | t={} | sensors={}/{} | queued={} | T={:.2}\u{00b0}C RH={:.1}%",
                    c.now, c.sensors_ok, c.sensors_polled, c.queued, c.temperature, c.humidity,
                );
            }
            AppEvent::HeaterTriggered { reason, wet_count } => {
                info!("HEAT | reason={:?} | wet_count={}", reason, wet_count);
            }
            AppEvent::SubmitOk { entries } => {
                info!("SUBMIT | ok | entries={}", entries);
            }
            AppEvent::SubmitFailed(e) => {
                warn!("SUBMIT | failed | {}", e);
            }
            AppEvent::ClockAnomaly { jump_secs } => {
                warn!("CLOCK | jumped back {}s", jump_secs);
            }
            AppEvent::WatchdogRestart { stale_secs } => {
                error!("WDOG | no submit for {}s, restarting", stale_secs);
            }
            AppEvent::RestartRequested => {
                warn!("ADMIN | restart requested");
            }
            AppEvent::PageShown(page) => {
                log::debug!("DISP | page={:?}", page);
            }
            AppEvent::Started { now } => {
                info!("START | t={}", now);
            }
        }
    }
}
