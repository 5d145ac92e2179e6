//! Creep-mitigation heater controller.
//!
//! Long exposure to near-saturated air makes capacitive humidity sensors
//! drift high ("creep").  The controller counts wet readings and, once the
//! count is high enough and conditions allow, asks for a short burst of
//! heater pulses on the sensor element.
//!
//! ## Trigger rule
//!
//! Evaluated once per measurement cycle, only when the heated sensor
//! returned a valid reading:
//!
//! 1. `humidity >= 90 %` increments the wet counter.
//! 2. Trigger when **all** of
//!    - wet counter `> 60`
//!    - `4 °C <= temperature <= 60 °C`
//!    - `humidity <= 75 %` (no longer saturated)
//!    - more than 10 s since the previous trigger
//!
//!    **or** the admin force flag is set.
//! 3. On trigger: the counter drops by 30 (not to zero, so repeated long
//!    saturation escalates), the trigger timestamp is set to `now`, and
//!    the force flag is consumed.
//!
//! The controller itself never touches hardware; it returns a
//! [`HeatSequence`] that the control loop plays through the heater port.

use log::{debug, info};

/// Humidity (%) at or above which a reading counts as "too wet".
pub const WET_THRESHOLD_PCT: f32 = 90.0;
/// Wet counter value that must be exceeded before an automatic trigger.
pub const WET_COUNT_TRIGGER: i32 = 60;
/// Amount the wet counter drops after each trigger.
pub const WET_COUNT_DECREMENT: i32 = 30;
/// Heating only below this humidity (%).
pub const MAX_HEAT_HUMIDITY_PCT: f32 = 75.0;
/// Heater is safe and effective only inside this range (°C).
pub const MIN_HEAT_TEMP_C: f32 = 4.0;
pub const MAX_HEAT_TEMP_C: f32 = 60.0;
/// Minimum seconds between two automatic triggers.
pub const COOLDOWN_SECS: i64 = 10;
/// Heater pulses per sequence.
pub const PULSES_PER_SEQUENCE: u8 = 3;

/// Inputs for one evaluation.  `None` means the heated sensor did not
/// deliver a valid value this cycle.
#[derive(Debug, Clone, Copy)]
pub struct HeaterInput {
    pub humidity: Option<f32>,
    pub temperature: Option<f32>,
    /// Wall-clock seconds.
    pub now: i64,
    /// Admin one-shot request.
    pub force: bool,
}

/// Why a sequence was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatReason {
    /// Wet counter exceeded and conditions allowed.
    Creep,
    /// Requested through the admin surface.
    Forced,
}

/// A heating burst the caller must execute: `pulses` heater activations,
/// with a settle delay between consecutive pulses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatSequence {
    pub pulses: u8,
    pub reason: HeatReason,
}

/// Hysteresis state.
#[derive(Debug, Clone)]
pub struct HeaterController {
    /// Accumulated wet readings.  Can go negative after forced triggers.
    wet_count: i32,
    /// Wall-clock seconds of the last trigger.
    last_trigger: i64,
}

impl HeaterController {
    /// `now` seeds the trigger timestamp so the cooldown also applies after boot.
    pub fn new(now: i64) -> Self {
        Self {
            wet_count: 0,
            last_trigger: now,
        }
    }

    /// Evaluate one cycle.
    ///
    /// Returns the sequence to run, if any.  Any returned sequence also
    /// satisfies a pending force request, so the caller clears the external
    /// force flag whenever the result is `Some`.
    pub fn evaluate(&mut self, input: HeaterInput) -> Option<HeatSequence> {
        // Without a valid reading the sensor may be unreachable; do not
        // command it.
        let (Some(humidity), Some(temperature)) = (input.humidity, input.temperature) else {
            debug!("heater: no valid reading, skipping");
            return None;
        };

        if humidity >= WET_THRESHOLD_PCT {
            self.wet_count = self.wet_count.saturating_add(1);
        }

        let creep_due = self.wet_count > WET_COUNT_TRIGGER
            && (MIN_HEAT_TEMP_C..=MAX_HEAT_TEMP_C).contains(&temperature)
            && humidity <= MAX_HEAT_HUMIDITY_PCT
            && input.now.saturating_sub(self.last_trigger) > COOLDOWN_SECS;

        let reason = if input.force {
            HeatReason::Forced
        } else if creep_due {
            HeatReason::Creep
        } else {
            return None;
        };

        self.wet_count = self.wet_count.saturating_sub(WET_COUNT_DECREMENT);
        self.last_trigger = input.now;
        info!(
            "heater: triggered ({:?}) at T={:.1}\u{00b0}C RH={:.1}%, wet_count now {}",
            reason, temperature, humidity, self.wet_count
        );

        Some(HeatSequence {
            pulses: PULSES_PER_SEQUENCE,
            reason,
        })
    }

    /// Current wet counter (diagnostics / status page).
    pub fn wet_count(&self) -> i32 {
        self.wet_count
    }

    /// Wall-clock seconds of the last trigger.
    pub fn last_trigger(&self) -> i64 {
        self.last_trigger
    }

    /// Shift the trigger timestamp after a backward clock jump so the
    /// cooldown does not stall for the size of the jump.
    pub fn resync_clock(&mut self, now: i64) {
        if self.last_trigger > now {
            self.last_trigger = now;
        }
    }

    #[cfg(test)]
    pub(crate) fn with_state(wet_count: i32, last_trigger: i64) -> Self {
        Self {
            wet_count,
            last_trigger,
        }
    }
}
