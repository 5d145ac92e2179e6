//! System adapter: restart primitive and OTA image state.
//!
//! - **`target_os = "espidf"`**: `esp_ota` for restart and mark-valid,
//!   the raw OTA partition API for the pending-verify query.
//! - **all other targets**: the process exits; no image is ever pending.

use log::{info, warn};

use crate::app::ports::RestartPort;

#[derive(Default)]
pub struct SystemRestart;

impl RestartPort for SystemRestart {
    #[cfg(target_os = "espidf")]
    fn restart_device(&mut self) -> ! {
        warn!("system: restarting");
        esp_ota::restart();
    }

    #[cfg(not(target_os = "espidf"))]
    fn restart_device(&mut self) -> ! {
        warn!("system: restart requested (simulation), exiting");
        std::process::exit(3);
    }
}

/// True if the running image was just flashed and awaits confirmation.
/// Unconfirmed images roll back on the next reset.
#[cfg(target_os = "espidf")]
pub fn firmware_pending_verify() -> bool {
    use esp_idf_svc::sys::*;

    // SAFETY: read-only queries against the partition table.
    unsafe {
        let running = esp_ota_get_running_partition();
        if running.is_null() {
            return false;
        }
        let mut state: esp_ota_img_states_t = 0;
        esp_ota_get_state_partition(running, &mut state) == ESP_OK
            && state == esp_ota_img_states_t_ESP_OTA_IMG_PENDING_VERIFY
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn firmware_pending_verify() -> bool {
    false
}

/// Confirm the running image, cancelling the rollback.
#[cfg(target_os = "espidf")]
pub fn mark_firmware_valid() {
    match esp_ota::mark_app_valid() {
        Ok(()) => info!("OTA: firmware marked valid (rollback cancelled)"),
        Err(e) => warn!("OTA: mark_app_valid failed: {:?}", e),
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn mark_firmware_valid() {
    info!("OTA: mark valid (simulation): skipped");
}
