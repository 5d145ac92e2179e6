//! Submission watchdog.
//!
//! Software liveness check over upstream reporting, separate from the
//! hardware task watchdog.  A station that keeps measuring but cannot
//! reach the reporting endpoint for a long time is assumed to have a
//! wedged network stack; a full restart is the remedy.
//!
//! Restart is requested when **all** hold:
//!
//! - uptime `> grace`
//! - seconds since the last successful report `> grace`
//! - that same span `< sanity bound` (a larger span is a wall-clock jump
//!   after NTP sync, not real staleness)

use log::{error, info, warn};

use crate::config::SystemConfig;

/// Result of one watchdog check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogVerdict {
    Healthy,
    /// No successful report for `stale_secs`; the device should restart.
    RestartRequired { stale_secs: i64 },
}

/// Tracks the last successful submission.
#[derive(Debug, Clone)]
pub struct SubmitWatchdog {
    /// Wall-clock seconds of the last successful report.
    last_success: i64,
    grace_secs: i64,
    sanity_bound_secs: i64,
}

impl SubmitWatchdog {
    /// `now` seeds the last-success timestamp: the wall clock is not
    /// guaranteed to restart at zero after a software reset.
    pub fn new(config: &SystemConfig, now: i64) -> Self {
        Self {
            last_success: now,
            grace_secs: i64::from(config.watchdog_grace_secs),
            sanity_bound_secs: i64::from(config.watchdog_sanity_bound_secs),
        }
    }

    /// Record the outcome of a reporting attempt.
    pub fn record(&mut self, success: bool, now: i64) {
        if success {
            self.last_success = now;
        } else {
            warn!(
                "watchdog: submit failed, last success {}s ago",
                now.saturating_sub(self.last_success)
            );
        }
    }

    /// Evaluate staleness.  Called once per measurement cycle, after
    /// [`record`](Self::record).
    pub fn check(&self, uptime_secs: u64, now: i64) -> WatchdogVerdict {
        let stale = now.saturating_sub(self.last_success);
        let uptime = i64::try_from(uptime_secs).unwrap_or(i64::MAX);

        if uptime > self.grace_secs && stale > self.grace_secs && stale < self.sanity_bound_secs {
            error!("watchdog: no successful submit in {}s, restart required", stale);
            return WatchdogVerdict::RestartRequired { stale_secs: stale };
        }

        if stale >= self.sanity_bound_secs {
            info!(
                "watchdog: last success {}s ago exceeds sanity bound, treating as clock jump",
                stale
            );
        }
        WatchdogVerdict::Healthy
    }

    /// Seconds since the last successful report (negative after a backward
    /// clock jump).
    pub fn secs_since_success(&self, now: i64) -> i64 {
        now.saturating_sub(self.last_success)
    }

    /// Pull the last-success timestamp back after a backward clock jump.
    pub fn resync_clock(&mut self, now: i64) {
        if self.last_success > now {
            self.last_success = now;
        }
    }
}
