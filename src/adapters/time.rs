//! Time adapters.
//!
//! [`SystemClock`] implements [`ClockPort`]:
//!
//! - **wall clock**: `SystemTime` on both targets (ESP-IDF maps it to
//!   `gettimeofday`, set by SNTP).  Jumps when SNTP syncs.
//! - **uptime**: `esp_timer_get_time()` on ESP-IDF (monotonic,
//!   microsecond precision); `std::time::Instant` on the host.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::app::ports::ClockPort;

/// Wall clock plus monotonic uptime.
pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

impl ClockPort for SystemClock {
    fn now_secs(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
            // Clock set before 1970: report it as negative seconds.
            Err(e) => -i64::try_from(e.duration().as_secs()).unwrap_or(i64::MAX),
        }
    }

    #[cfg(target_os = "espidf")]
    fn uptime_secs(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000_000
    }

    #[cfg(not(target_os = "espidf"))]
    fn uptime_secs(&self) -> u64 {
        self.start.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_clock_is_after_2020() {
        assert!(SystemClock::new().now_secs() > 1_577_836_800);
    }

    #[test]
    fn uptime_starts_near_zero() {
        assert!(SystemClock::new().uptime_secs() < 5);
    }
}
