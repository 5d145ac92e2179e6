//! Inbound admin actions.
//!
//! The admin surface (HTTP status endpoint, serial console) runs outside
//! the control task.  It never calls into the [`ControlLoop`] directly;
//! it flips advisory one-shot flags in [`AdminFlags`] which the loop
//! consumes on its next tick.  The flags are plain atomic booleans:
//! a lost race only delays an action by one tick.
//!
//! [`ControlLoop`]: super::service::ControlLoop

use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use log::{info, warn};

/// Actions the admin surface can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    /// Run one heating sequence on the next measurement cycle, bypassing
    /// the creep conditions.
    ForceHeater,
    /// Restart the device at the top of the next control tick.
    Restart,
    /// Confirm the running firmware after an OTA update.
    MarkFirmwareGood,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminError {
    /// `MarkFirmwareGood` while the running image is not pending verification.
    NothingPending,
}

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingPending => write!(f, "no firmware pending verification"),
        }
    }
}

/// Flags shared between the admin surface and the control loop.
#[derive(Debug, Default)]
pub struct AdminFlags {
    force_heater: AtomicBool,
    restart_requested: AtomicBool,
    pending_fw_verify: AtomicBool,
    /// Mirror of the heater wet counter, written by the control loop.
    wet_count: AtomicI32,
}

impl AdminFlags {
    pub const fn new() -> Self {
        Self {
            force_heater: AtomicBool::new(false),
            restart_requested: AtomicBool::new(false),
            pending_fw_verify: AtomicBool::new(false),
            wet_count: AtomicI32::new(0),
        }
    }

    /// Apply an admin action.
    ///
    /// `MarkFirmwareGood` only clears the pending flag; the caller commits
    /// the boot partition once this returns `Ok`.
    pub fn apply(&self, cmd: AdminCommand) -> Result<(), AdminError> {
        match cmd {
            AdminCommand::ForceHeater => {
                info!("admin: heater forced for next measurement");
                self.force_heater.store(true, Ordering::Relaxed);
            }
            AdminCommand::Restart => {
                info!("admin: restart requested");
                self.restart_requested.store(true, Ordering::Relaxed);
            }
            AdminCommand::MarkFirmwareGood => {
                if !self.pending_fw_verify.swap(false, Ordering::AcqRel) {
                    warn!("admin: mark-good rejected, nothing pending");
                    return Err(AdminError::NothingPending);
                }
                info!("admin: firmware marked good");
            }
        }
        Ok(())
    }

    // ── Control-loop side ─────────────────────────────────────

    pub fn force_heater(&self) -> bool {
        self.force_heater.load(Ordering::Relaxed)
    }

    pub fn clear_force_heater(&self) {
        self.force_heater.store(false, Ordering::Relaxed);
    }

    pub fn restart_requested(&self) -> bool {
        self.restart_requested.load(Ordering::Relaxed)
    }

    /// Set at boot when the running image still awaits confirmation.
    pub fn set_pending_fw_verify(&self, pending: bool) {
        self.pending_fw_verify.store(pending, Ordering::Release);
    }

    pub fn pending_fw_verify(&self) -> bool {
        self.pending_fw_verify.load(Ordering::Acquire)
    }

    pub fn publish_wet_count(&self, count: i32) {
        self.wet_count.store(count, Ordering::Relaxed);
    }

    pub fn wet_count(&self) -> i32 {
        self.wet_count.load(Ordering::Relaxed)
    }
}
