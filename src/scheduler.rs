//! Cadence scheduler for the control loop.
//!
//! Two independent cadences share one cooperative tick:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  tick(now)                                                   │
//! │    │                                                         │
//! │    ├─ now < last fire?  ──▶ clock jumped back: resync both   │
//! │    │                                                         │
//! │    ├─ measurement due?  ──▶ DueTask::Measurement             │
//! │    │                                                         │
//! │    ├─ display due?      ──▶ DueTask::Display                 │
//! │    │                                                         │
//! │    └─ otherwise         ──▶ idle (caller sleeps one tick)    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Measurement wins when both are due; the display catches up on the
//! next tick.  Timestamps are wall-clock seconds, which can jump after
//! NTP sync or a reset, so a backward jump is detected on every poll.

use log::{error, info};

use crate::config::SystemConfig;

// ═══════════════════════════════════════════════════════════════
//  Cadence
// ═══════════════════════════════════════════════════════════════

/// A fixed-interval timer over wall-clock seconds.
#[derive(Debug, Clone)]
pub struct Cadence {
    /// Human-readable label for logs.
    pub label: &'static str,
    interval_secs: i64,
    last_fired: i64,
}

impl Cadence {
    /// Create a cadence that first fires one full interval after `now`.
    pub fn new(label: &'static str, interval_secs: u32, now: i64) -> Self {
        Self {
            label,
            interval_secs: i64::from(interval_secs),
            last_fired: now,
        }
    }

    pub fn is_due(&self, now: i64) -> bool {
        now.saturating_sub(self.last_fired) >= self.interval_secs
    }

    pub fn mark_fired(&mut self, now: i64) {
        self.last_fired = now;
    }

    pub fn last_fired(&self) -> i64 {
        self.last_fired
    }

    /// True if `now` lies before the last fire time.
    fn clock_went_back(&self, now: i64) -> bool {
        self.last_fired > now
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

/// Work selected for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueTask {
    Measurement,
    Display,
}

/// Outcome of [`Scheduler::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poll {
    /// Seconds the clock jumped backwards, if a jump was detected.
    pub clock_jump_secs: Option<i64>,
    pub due: Option<DueTask>,
}

pub struct Scheduler {
    measurement: Cadence,
    display: Cadence,
}

impl Scheduler {
    pub fn new(config: &SystemConfig, now: i64) -> Self {
        info!(
            "Scheduler: measure every {}s, display every {}s",
            config.measurement_interval_secs, config.display_interval_secs
        );
        Self {
            measurement: Cadence::new("measurement", config.measurement_interval_secs, now),
            display: Cadence::new("display", config.display_interval_secs, now),
        }
    }

    /// Pick the work due at `now` and mark it fired.
    pub fn poll(&mut self, now: i64) -> Poll {
        let mut clock_jump_secs = None;

        if self.measurement.clock_went_back(now) || self.display.clock_went_back(now) {
            let jump = self
                .measurement
                .last_fired()
                .max(self.display.last_fired())
                .saturating_sub(now);
            error!(
                "Scheduler: time jumped backwards by {}s, resyncing cadences",
                jump
            );
            self.measurement.mark_fired(now);
            self.display.mark_fired(now);
            clock_jump_secs = Some(jump);
        }

        let due = if self.measurement.is_due(now) {
            self.measurement.mark_fired(now);
            Some(DueTask::Measurement)
        } else if self.display.is_due(now) {
            self.display.mark_fired(now);
            Some(DueTask::Display)
        } else {
            None
        };

        Poll {
            clock_jump_secs,
            due,
        }
    }

    /// Wall-clock second of the last measurement cycle.
    pub fn last_measurement(&self) -> i64 {
        self.measurement.last_fired()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
