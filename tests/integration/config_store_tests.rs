//! Config persistence through the NVS adapter, feeding a control loop.

use std::sync::Arc;

use envstation::adapters::nvs::NvsAdapter;
use envstation::app::ports::{ConfigError, ConfigPort, SensorConfig};
use envstation::app::service::ControlLoop;
use envstation::config::SystemConfig;
use envstation::measurement::{Quantity, SensorId};
use envstation::status::SharedState;

use crate::support::T0;

#[test]
fn stored_sensor_selection_survives_reload() {
    let nvs = NvsAdapter::new().unwrap();
    let mut cfg = SystemConfig::default();
    cfg.sensors.set(SensorId::Rg15, false);
    cfg.sensors.set(SensorId::Sen50, false);
    nvs.save(&cfg).unwrap();

    let loaded = nvs.load().unwrap();
    assert!(!loaded.sensor_enabled(SensorId::Rg15));
    assert!(!loaded.quantity_available(Quantity::Pm025));
    assert!(loaded.quantity_available(Quantity::Co2));

    let control = ControlLoop::new(loaded, Arc::new(SharedState::new()), T0);
    assert!(!control.config().sensors.sen50);
}

#[test]
fn rejected_save_keeps_previous_config() {
    let nvs = NvsAdapter::new().unwrap();
    let good = SystemConfig {
        display_interval_secs: 10,
        ..Default::default()
    };
    nvs.save(&good).unwrap();

    let bad = SystemConfig {
        watchdog_grace_secs: 30,
        ..Default::default()
    };
    assert!(matches!(nvs.save(&bad), Err(ConfigError::ValidationFailed(_))));
    assert_eq!(nvs.load().unwrap().display_interval_secs, 10);
}
