//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`] for the station.  The config is stored as a
//! single postcard blob.
//!
//! - Validation: [`SystemConfig::validate`] runs before every write.
//! - A missing or undecodable blob loads as defaults; a station with a
//!   damaged config keeps measuring.
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.
//!   The host backend is an in-memory map.

use log::{debug, info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const CONFIG_NAMESPACE: &str = "envstation";
const CONFIG_KEY: &str = "syscfg";

#[cfg(target_os = "espidf")]
const MAX_BLOB_SIZE: usize = 1024;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// On first boot or after a version mismatch the NVS partition is
    /// erased and re-initialised automatically.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from the main task before any other
            // NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// Raw blob access for tests (simulation backend only).
    #[cfg(not(target_os = "espidf"))]
    pub fn put_raw(&self, bytes: Vec<u8>) {
        self.store
            .borrow_mut()
            .insert(Self::composite_key(CONFIG_NAMESPACE, CONFIG_KEY), bytes);
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut ns_buf = [0u8; 16];
        let ns_bytes = namespace.as_bytes();
        let len = ns_bytes.len().min(15);
        ns_buf[..len].copy_from_slice(&ns_bytes[..len]);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_blob(&self) -> Option<Vec<u8>> {
        self.store
            .borrow()
            .get(&Self::composite_key(CONFIG_NAMESPACE, CONFIG_KEY))
            .cloned()
    }

    #[cfg(target_os = "espidf")]
    fn read_blob(&self) -> Option<Vec<u8>> {
        let result = Self::with_nvs_handle(CONFIG_NAMESPACE, false, |handle| {
            let key_cstr = b"syscfg\0";
            let mut size: usize = 0;

            // First call: get size
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    key_cstr.as_ptr() as *const _,
                    core::ptr::null_mut(),
                    &mut size,
                )
            };
            if ret != ESP_OK || size == 0 || size > MAX_BLOB_SIZE {
                return Err(ret);
            }

            let mut buf = vec![0u8; size];
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    key_cstr.as_ptr() as *const _,
                    buf.as_mut_ptr() as *mut _,
                    &mut size,
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(buf)
        });

        match result {
            Ok(bytes) => Some(bytes),
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND => None,
            Err(e) => {
                warn!("NvsAdapter: NVS read error {}", e);
                None
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_blob(&self, bytes: Vec<u8>) -> Result<(), ConfigError> {
        self.put_raw(bytes);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn write_blob(&self, bytes: Vec<u8>) -> Result<(), ConfigError> {
        let result = Self::with_nvs_handle(CONFIG_NAMESPACE, true, |handle| {
            let key_cstr = b"syscfg\0";
            let ret = unsafe {
                nvs_set_blob(
                    handle,
                    key_cstr.as_ptr() as *const _,
                    bytes.as_ptr() as *const _,
                    bytes.len(),
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(())
        });
        match result {
            Ok(()) => Ok(()),
            Err(e) if e == ESP_ERR_NVS_NOT_ENOUGH_SPACE => Err(ConfigError::StorageFull),
            Err(e) => {
                warn!("NvsAdapter: NVS write error {}", e);
                Err(ConfigError::IoError)
            }
        }
    }
}

impl NvsAdapter {
    /// Decode and range-check the stored blob without any fallback.
    pub fn read_stored(&self) -> Result<SystemConfig, ConfigError> {
        let bytes = self.read_blob().ok_or(ConfigError::NotFound)?;
        let cfg = postcard::from_bytes::<SystemConfig>(&bytes).map_err(|e| {
            debug!("NvsAdapter: postcard decode failed: {}", e);
            ConfigError::Corrupted
        })?;
        cfg.validate()?;
        info!("NvsAdapter: loaded config ({} bytes)", bytes.len());
        Ok(cfg)
    }
}

impl ConfigPort for NvsAdapter {
    /// Stored config, or defaults when it is missing, corrupt or out of
    /// range.  Only a storage failure on save is an error.
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        match self.read_stored() {
            Ok(cfg) => Ok(cfg),
            Err(ConfigError::NotFound) => {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(SystemConfig::default())
            }
            Err(e) => {
                warn!("NvsAdapter: stored config rejected ({}), using defaults", e);
                Ok(SystemConfig::default())
            }
        }
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        let len = bytes.len();
        self.write_blob(bytes)?;
        info!("NvsAdapter: config saved ({} bytes)", len);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::SensorId;

    #[test]
    fn empty_store_loads_defaults() {
        let nvs = NvsAdapter::new().unwrap();
        let cfg = nvs.load().unwrap();
        assert_eq!(cfg.measurement_interval_secs, 60);
    }

    #[test]
    fn save_then_load() {
        let nvs = NvsAdapter::new().unwrap();
        let mut cfg = SystemConfig::default();
        cfg.sensors.set(SensorId::Sen50, false);
        cfg.display_interval_secs = 8;
        nvs.save(&cfg).unwrap();

        let loaded = nvs.load().unwrap();
        assert!(!loaded.sensors.sen50);
        assert_eq!(loaded.display_interval_secs, 8);
    }

    #[test]
    fn invalid_config_is_not_persisted() {
        let nvs = NvsAdapter::new().unwrap();
        let cfg = SystemConfig {
            measurement_interval_secs: 1,
            ..Default::default()
        };
        assert!(matches!(
            nvs.save(&cfg),
            Err(ConfigError::ValidationFailed(_))
        ));
        assert_eq!(nvs.load().unwrap().measurement_interval_secs, 60);
    }

    #[test]
    fn corrupt_blob_falls_back_to_defaults() {
        let nvs = NvsAdapter::new().unwrap();
        nvs.put_raw(vec![0xff; 3]);
        assert!(matches!(nvs.read_stored(), Err(ConfigError::Corrupted)));
        let cfg = nvs.load().unwrap();
        assert_eq!(cfg.hostname.as_str(), "envstation");
    }

    #[test]
    fn missing_and_out_of_range_blobs_are_told_apart() {
        let nvs = NvsAdapter::new().unwrap();
        assert!(matches!(nvs.read_stored(), Err(ConfigError::NotFound)));

        let bad = SystemConfig {
            idle_tick_ms: 1,
            ..Default::default()
        };
        nvs.put_raw(postcard::to_allocvec(&bad).unwrap());
        assert!(matches!(
            nvs.read_stored(),
            Err(ConfigError::ValidationFailed(_))
        ));
        assert_eq!(nvs.load().unwrap().idle_tick_ms, 1000);
    }
}
