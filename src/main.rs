//! EnvStation Firmware: Main Entry Point
//!
//! Hexagonal architecture with a single cooperative control task.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    LogEventSink   NvsAdapter    SystemClock   │
//! │  (Sensor+Heater)    (EventSink)    (Config)      (Clock)       │
//! │  HttpReporter       LogDisplay     SystemRestart               │
//! │  (Report)           (Display)      (Restart)                   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              ControlLoop (pure logic)                  │    │
//! │  │  Scheduler · Queue · Heater · Watchdog · Display       │    │
//! │  └───────────────────────────┬────────────────────────────┘    │
//! │                              ▼                                 │
//! │  SharedState ◀── HTTP status / admin handlers (httpd task)     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;

use anyhow::{Result, anyhow};
use embedded_svc::http::Method;
use embedded_svc::io::{Read, Write};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::modem::Modem;
use esp_idf_svc::hal::prelude::Peripherals;
use esp_idf_svc::http::server::{Configuration as HttpConfiguration, EspHttpServer};
use esp_idf_svc::sntp::EspSntp;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use log::{error, info, warn};

use envstation::adapters::hardware::HardwareAdapter;
use envstation::adapters::log_display::LogDisplay;
use envstation::adapters::log_sink::LogEventSink;
use envstation::adapters::nvs::NvsAdapter;
use envstation::adapters::report_http::HttpReporter;
use envstation::adapters::system::{self, SystemRestart};
use envstation::adapters::time::SystemClock;
use envstation::app::auth::check_admin_password;
use envstation::app::commands::{AdminCommand, AdminError};
use envstation::app::ports::{ClockPort, ConfigPort, RestartPort, SensorConfig};
use envstation::app::service::{ControlLoop, CycleOutcome};
use envstation::config::SystemConfig;
use envstation::measurement::SensorId;
use envstation::sensors::SensorHub;
use envstation::status::{SharedState, StatusReport};

// ── Network bring-up ──────────────────────────────────────────

/// Join the configured access point.  A failed join is logged, not fatal:
/// the submission watchdog restarts the device if reports never get out.
fn start_wifi(
    modem: Modem,
    sysloop: EspSystemEventLoop,
    config: &SystemConfig,
) -> Result<Option<BlockingWifi<EspWifi<'static>>>> {
    if config.wifi_ssid.is_empty() {
        warn!("WiFi: no SSID configured, radio stays off");
        return Ok(None);
    }

    let mut wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), None)?, sysloop)?;
    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: config.wifi_ssid.clone(),
        password: config.wifi_password.clone(),
        auth_method: if config.wifi_password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        },
        ..Default::default()
    }))?;
    wifi.start()?;

    match wifi.connect().and_then(|()| wifi.wait_netif_up()) {
        Ok(()) => info!("WiFi: connected to '{}'", config.wifi_ssid),
        Err(e) => warn!("WiFi: connect failed ({:?}), continuing offline", e),
    }
    Ok(Some(wifi))
}

// ── Status / admin surface ────────────────────────────────────

/// Admin form bodies are small; anything larger is refused unread.
const MAX_ADMIN_BODY: usize = 256;

fn read_request_body(
    req: &mut esp_idf_svc::http::server::Request<
        &mut esp_idf_svc::http::server::EspHttpConnection<'_>,
    >,
) -> Result<Vec<u8>> {
    let len = req.content_len().unwrap_or(0) as usize;
    if len > MAX_ADMIN_BODY {
        return Err(anyhow!("request body too large"));
    }
    let mut body = vec![0_u8; len];
    if len > 0 {
        req.read_exact(&mut body)?;
    }
    Ok(body)
}

fn start_http(shared: &Arc<SharedState>, config: &SystemConfig) -> Result<EspHttpServer<'static>> {
    let mut server = EspHttpServer::new(&HttpConfiguration::default())?;

    let state = Arc::clone(shared);
    server.fn_handler::<anyhow::Error, _>("/status.json", Method::Get, move |req| {
        let body = StatusReport::capture(&state).to_json()?;
        req.into_response(200, Some("OK"), &[("Content-Type", "application/json")])?
            .write_all(body.as_bytes())?;
        Ok(())
    })?;

    let actions = [
        ("/admin/forceheater", AdminCommand::ForceHeater),
        ("/admin/reboot", AdminCommand::Restart),
        ("/admin/markfwasgood", AdminCommand::MarkFirmwareGood),
    ];
    for (uri, cmd) in actions {
        let state = Arc::clone(shared);
        let password = config.admin_password.clone();
        server.fn_handler::<anyhow::Error, _>(uri, Method::Post, move |mut req| {
            let body = read_request_body(&mut req)?;
            if let Err(e) = check_admin_password(&body, &password) {
                warn!("HTTP: {} refused: {}", uri, e);
                req.into_status_response(e.status())?
                    .write_all(e.to_string().as_bytes())?;
                return Ok(());
            }
            match state.admin.apply(cmd) {
                Ok(()) => {
                    if cmd == AdminCommand::MarkFirmwareGood {
                        system::mark_firmware_valid();
                    }
                    req.into_ok_response()?.write_all(b"OK")?;
                }
                Err(e @ AdminError::NothingPending) => {
                    req.into_status_response(400)?
                        .write_all(e.to_string().as_bytes())?;
                }
            }
            Ok(())
        })?;
    }

    info!("HTTP: status and admin handlers registered");
    Ok(server)
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  EnvStation v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let shared = Arc::new(SharedState::new());

    // ── 2. OTA image state ────────────────────────────────────
    if system::firmware_pending_verify() {
        warn!("OTA: running image is pending verification");
        shared.admin.set_pending_fw_verify(true);
    }

    // ── 3. Load config from NVS (or defaults) ─────────────────
    let config = match NvsAdapter::new().and_then(|nvs| nvs.load()) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("NVS unavailable ({}), using defaults", e);
            SystemConfig::default()
        }
    };

    // ── 4. Network, wall clock, status surface ────────────────
    let peripherals = Peripherals::take().map_err(|e| anyhow!("peripherals: {:?}", e))?;
    let sysloop = EspSystemEventLoop::take()?;
    let _wifi = start_wifi(peripherals.modem, sysloop, &config)?;
    let _sntp = EspSntp::new_default()?;
    let _http = match start_http(&shared, &config) {
        Ok(server) => Some(server),
        Err(e) => {
            error!("HTTP: server start failed: {}", e);
            None
        }
    };

    // ── 5. Construct adapters ─────────────────────────────────
    // Bus drivers register here; a fitted sensor without a driver
    // reads as absent every cycle.
    let hub = SensorHub::new();
    for sensor in SensorId::ALL {
        if config.sensor_enabled(sensor) && !hub.has(sensor) {
            warn!("{}: enabled but no driver registered", sensor.name());
        }
    }
    let mut hw = HardwareAdapter::new(hub, FreeRtos);
    let mut display = LogDisplay::new();
    let mut reporter = HttpReporter::new(&config);
    let mut sink = LogEventSink::new();
    let mut restart = SystemRestart;
    let clock = SystemClock::new();

    // ── 6. Control loop ───────────────────────────────────────
    let now = clock.now_secs();
    let mut control = ControlLoop::new(config, Arc::clone(&shared), now);
    control.start(now, &mut sink);

    info!("System ready. Entering control loop.");

    loop {
        let outcome = control.tick(
            clock.now_secs(),
            clock.uptime_secs(),
            &mut hw,
            &mut display,
            &mut reporter,
            &mut sink,
        );
        match outcome {
            CycleOutcome::Restart(reason) => {
                warn!("Restarting: {:?}", reason);
                restart.restart_device();
            }
            CycleOutcome::Idle => FreeRtos::delay_ms(control.idle_tick_ms()),
            CycleOutcome::Measured { .. } | CycleOutcome::Displayed(_) => {}
        }
    }
}
