//! Control loop: the hexagonal core.
//!
//! [`ControlLoop`] owns the scheduler, submission queue, heater controller,
//! submission watchdog and display rotation.  It writes the shared snapshot
//! store and reads the admin flags; everything else flows through port
//! traits injected at call sites, making the loop testable with mock
//! adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌──────────────────────────┐ ──▶ ReportPort
//!   HeaterPort ◀── │       ControlLoop         │ ──▶ DisplayPort
//!      DelayNs ◀── │ Sched · Queue · Heater ·  │ ──▶ EventSink
//!                  │ Watchdog · Display        │
//!                  └────────────┬─────────────┘
//!                               ▼
//!                  SharedState (snapshots, admin flags)
//! ```
//!
//! One measurement cycle:
//!
//! 1. request every fitted sensor, wait one settle delay, read results
//! 2. clear the queue and priority-merge every valid sample into it
//! 3. stage a snapshot from the merged queue
//! 4. run the heater hysteresis on the heated sensor's own reading
//! 5. publish the snapshot
//! 6. flush the queue upstream, feed the watchdog

use std::sync::Arc;

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::display::{DisplayRotation, Identity, Page};
use crate::heater::{HeaterController, HeaterInput};
use crate::measurement::{Quantity, SensorId};
use crate::queue::SubmissionQueue;
use crate::scheduler::{DueTask, Scheduler};
use crate::status::SharedState;
use crate::watchdog::{SubmitWatchdog, WatchdogVerdict};

use super::events::{AppEvent, CycleSummary};
use super::ports::{DisplayPort, EventSink, HeaterPort, ReportPort, SensorConfig, SensorPort};

// ───────────────────────────────────────────────────────────────
// Outcomes
// ───────────────────────────────────────────────────────────────

/// Why the device must restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartReason {
    /// Requested through the admin surface.
    AdminRequest,
    /// No successful submit for `stale_secs`.
    SubmitStale { stale_secs: i64 },
}

/// What one [`ControlLoop::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing was due; the caller sleeps one idle tick.
    Idle,
    /// A measurement cycle ran.  `submitted` is true if upstream accepted it.
    Measured { submitted: bool },
    /// A display page was rendered.
    Displayed(Page),
    /// The caller must invoke the restart primitive.
    Restart(RestartReason),
}

// ───────────────────────────────────────────────────────────────
// ControlLoop
// ───────────────────────────────────────────────────────────────

pub struct ControlLoop {
    config: SystemConfig,
    shared: Arc<SharedState>,
    scheduler: Scheduler,
    queue: SubmissionQueue,
    heater: HeaterController,
    watchdog: SubmitWatchdog,
    display: DisplayRotation,
    identity: Identity,
    measurement_cycles: u64,
}

impl ControlLoop {
    /// Build the loop.  Every timestamp starts at `now`.
    pub fn new(config: SystemConfig, shared: Arc<SharedState>, now: i64) -> Self {
        let identity = Identity {
            hostname: config.hostname.clone(),
            version: env!("CARGO_PKG_VERSION"),
        };
        Self {
            scheduler: Scheduler::new(&config, now),
            queue: SubmissionQueue::new(),
            heater: HeaterController::new(now),
            watchdog: SubmitWatchdog::new(&config, now),
            display: DisplayRotation::new(),
            identity,
            shared,
            config,
            measurement_cycles: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, now: i64, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started { now });
        info!(
            "ControlLoop started: {} sensor(s) fitted",
            SensorId::ALL
                .iter()
                .filter(|s| self.config.sensor_enabled(**s))
                .count()
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one cooperative tick at wall-clock `now`.
    ///
    /// The `hw` parameter satisfies [`SensorPort`], [`HeaterPort`] and
    /// [`DelayNs`]: sensor settle and heater pulses share one bus owner.
    pub fn tick(
        &mut self,
        now: i64,
        uptime_secs: u64,
        hw: &mut (impl SensorPort + HeaterPort + DelayNs),
        display: &mut impl DisplayPort,
        report: &mut impl ReportPort,
        sink: &mut impl EventSink,
    ) -> CycleOutcome {
        // 1. Admin restart is honoured before any other work.
        if self.shared.admin.restart_requested() {
            sink.emit(&AppEvent::RestartRequested);
            return CycleOutcome::Restart(RestartReason::AdminRequest);
        }

        // 2. Cadences, with backward clock jump detection.
        let poll = self.scheduler.poll(now);
        if let Some(jump_secs) = poll.clock_jump_secs {
            self.heater.resync_clock(now);
            self.watchdog.resync_clock(now);
            sink.emit(&AppEvent::ClockAnomaly { jump_secs });
        }

        match poll.due {
            Some(DueTask::Measurement) => self.measure(now, uptime_secs, hw, report, sink),
            Some(DueTask::Display) => {
                let page = self.show_page(display, sink);
                CycleOutcome::Displayed(page)
            }
            None => CycleOutcome::Idle,
        }
    }

    // ── Measurement cycle ─────────────────────────────────────

    fn measure(
        &mut self,
        now: i64,
        uptime_secs: u64,
        hw: &mut (impl SensorPort + HeaterPort + DelayNs),
        report: &mut impl ReportPort,
        sink: &mut impl EventSink,
    ) -> CycleOutcome {
        self.measurement_cycles += 1;

        let fitted: Vec<SensorId, { SensorId::COUNT }> = SensorId::ALL
            .iter()
            .copied()
            .filter(|s| self.config.sensor_enabled(*s))
            .collect();

        // Start every conversion, then wait once for all of them.
        for sensor in &fitted {
            hw.request_measurement(*sensor);
        }
        if !fitted.is_empty() {
            hw.delay_ms(self.config.sensor_settle_ms);
        }

        self.queue.clear();
        let mut heated = (None, None);
        let mut sensors_ok = 0u8;
        for sensor in &fitted {
            let Some(m) = hw.read_result(*sensor) else {
                warn!("{}: no valid reading this cycle", sensor.name());
                continue;
            };
            sensors_ok += 1;
            for sample in m.samples() {
                if !sample.value.is_finite() {
                    continue;
                }
                self.queue.enqueue(
                    sample.quantity,
                    sample.value,
                    sensor.priority(sample.quantity),
                );
            }
            if sensor.has_heater() {
                heated = (m.get(Quantity::Humidity), m.get(Quantity::Temperature));
            }
        }

        // Stage the snapshot from the merged queue so readers see the
        // same winner that is reported.  The heater stamp predates this
        // cycle's heater decision.
        let mut staged = self.shared.snapshots.begin_write();
        staged.clear_readings();
        staged.last_update = now;
        staged.last_heater = self.heater.last_trigger();
        for entry in self.queue.entries() {
            staged.set(entry.quantity, entry.value);
        }
        let summary = CycleSummary {
            now,
            sensors_ok,
            sensors_polled: fitted.len() as u8,
            queued: self.queue.len(),
            temperature: staged.temperature,
            humidity: staged.humidity,
        };

        let (humidity, temperature) = heated;
        let input = HeaterInput {
            humidity,
            temperature,
            now,
            force: self.shared.admin.force_heater(),
        };
        if let Some(seq) = self.heater.evaluate(input) {
            self.shared.admin.clear_force_heater();
            for pulse in 0..seq.pulses {
                if pulse > 0 {
                    hw.delay_ms(self.config.heater_pulse_settle_ms);
                }
                hw.pulse_heater();
            }
            sink.emit(&AppEvent::HeaterTriggered {
                reason: seq.reason,
                wet_count: self.heater.wet_count(),
            });
        }

        staged.publish();
        self.shared.admin.publish_wet_count(self.heater.wet_count());
        sink.emit(&AppEvent::MeasurementCycle(summary));

        // Report.
        let submitted = if self.queue.is_empty() {
            debug!("no valid values this cycle, nothing to submit");
            false
        } else {
            match report.flush(self.queue.entries()) {
                Ok(()) => {
                    sink.emit(&AppEvent::SubmitOk {
                        entries: self.queue.len(),
                    });
                    true
                }
                Err(e) => {
                    sink.emit(&AppEvent::SubmitFailed(e));
                    false
                }
            }
        };
        if !self.queue.is_empty() {
            self.watchdog.record(submitted, now);
        }

        match self.watchdog.check(uptime_secs, now) {
            WatchdogVerdict::Healthy => CycleOutcome::Measured { submitted },
            WatchdogVerdict::RestartRequired { stale_secs } => {
                sink.emit(&AppEvent::WatchdogRestart { stale_secs });
                CycleOutcome::Restart(RestartReason::SubmitStale { stale_secs })
            }
        }
    }

    // ── Display ───────────────────────────────────────────────

    fn show_page(&mut self, display: &mut impl DisplayPort, sink: &mut impl EventSink) -> Page {
        let snapshot = self.shared.snapshots.current();
        let view = self.display.step(&snapshot, &self.config, &self.identity);
        display.render(&view, &snapshot);
        sink.emit(&AppEvent::PageShown(view.page));
        view.page
    }

    /// Leave the sticky "no pages" page, e.g. after a config change.
    pub fn reset_display(&mut self) {
        self.display.return_to_identification();
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn shared(&self) -> &Arc<SharedState> {
        &self.shared
    }

    pub fn queue(&self) -> &SubmissionQueue {
        &self.queue
    }

    pub fn heater(&self) -> &HeaterController {
        &self.heater
    }

    pub fn display(&self) -> &DisplayRotation {
        &self.display
    }

    /// Seconds since the last successful submit.
    pub fn secs_since_submit(&self, now: i64) -> i64 {
        self.watchdog.secs_since_success(now)
    }

    /// Measurement cycles run since startup.
    pub fn measurement_cycles(&self) -> u64 {
        self.measurement_cycles
    }

    /// Sleep between ticks when nothing was due.
    pub fn idle_tick_ms(&self) -> u32 {
        self.config.idle_tick_ms
    }
}
