//! Upstream report adapter (wetter.poempelfox.de push API).
//!
//! Implements [`ReportPort`].  One flush is one HTTPS POST carrying every
//! queued value:
//!
//! ```text
//! POST <report_url>
//! X-Sensor: <token>
//! {"software_version":"envstation-0.3.0",
//!  "sensordatavalues":[{"value_type":"96","value":"21.460"}, …]}
//! ```
//!
//! A missing token or an empty payload fails before any network traffic.  The
//! payload builder is target independent; the POST itself is ESP-IDF only.

use heapless::String;
use log::{debug, info};
use serde::Serialize;

use crate::app::ports::ReportPort;
use crate::config::SystemConfig;
use crate::error::ReportError;
use crate::measurement::Quantity;
use crate::queue::QueueEntry;

/// Token shipped in sample configs; never a real sensor.
const PLACEHOLDER_TOKEN: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLM123456789";
/// Request body limit.
pub const MAX_PAYLOAD_BYTES: usize = 800;

#[cfg(target_os = "espidf")]
const REQUEST_TIMEOUT: core::time::Duration = core::time::Duration::from_secs(5);

/// Upstream value type for `quantity`.
pub const fn value_type(quantity: Quantity) -> &'static str {
    match quantity {
        Quantity::Temperature => "96",
        Quantity::Humidity => "97",
        Quantity::Co2 => "98",
        Quantity::Pressure => "90",
        Quantity::Rain => "91",
        Quantity::Pm010 => "92",
        Quantity::Pm025 => "93",
        Quantity::Pm040 => "94",
        Quantity::Pm100 => "95",
    }
}

#[derive(Serialize)]
struct DataValue {
    value_type: &'static str,
    value: String<24>,
}

#[derive(Serialize)]
struct Payload<'a> {
    software_version: &'a str,
    sensordatavalues: Vec<DataValue>,
}

/// Build the JSON body for `entries`.
pub fn build_payload(entries: &[QueueEntry]) -> Result<std::string::String, ReportError> {
    use core::fmt::Write;

    let mut values = Vec::with_capacity(entries.len());
    for e in entries {
        let mut value = String::new();
        write!(value, "{:.3}", e.value).map_err(|_| ReportError::PayloadTooLarge)?;
        values.push(DataValue {
            value_type: value_type(e.quantity),
            value,
        });
    }
    if values.is_empty() {
        return Err(ReportError::NothingToSend);
    }

    let payload = Payload {
        software_version: concat!("envstation-", env!("CARGO_PKG_VERSION")),
        sensordatavalues: values,
    };
    let body = serde_json::to_string(&payload).map_err(|_| ReportError::PayloadTooLarge)?;
    if body.len() > MAX_PAYLOAD_BYTES {
        return Err(ReportError::PayloadTooLarge);
    }
    Ok(body)
}

/// HTTP report transport.
pub struct HttpReporter {
    #[cfg(target_os = "espidf")]
    url: String<96>,
    token: String<64>,
    reports_sent: u32,
}

impl HttpReporter {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            #[cfg(target_os = "espidf")]
            url: config.report_url.clone(),
            token: config.report_token.clone(),
            reports_sent: 0,
        }
    }

    pub fn reports_sent(&self) -> u32 {
        self.reports_sent
    }

    fn has_token(&self) -> bool {
        !self.token.is_empty() && self.token.as_str() != PLACEHOLDER_TOKEN
    }

    #[cfg(target_os = "espidf")]
    fn post(&self, body: &str) -> Result<(), ReportError> {
        use embedded_svc::http::Status;
        use embedded_svc::http::client::Client;
        use embedded_svc::io::Write;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
        use log::warn;

        let conf = Configuration {
            timeout: Some(REQUEST_TIMEOUT),
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        };
        let conn = EspHttpConnection::new(&conf).map_err(|e| {
            warn!("report: HTTP client init failed: {:?}", e);
            ReportError::Transport
        })?;
        let mut client = Client::wrap(conn);

        let len = body.len().to_string();
        let headers = [
            ("Content-Type", "application/json"),
            ("Content-Length", len.as_str()),
            ("X-Sensor", self.token.as_str()),
            ("User-Agent", "EnvStation (ESP32)"),
        ];
        let mut request = client
            .post(self.url.as_str(), &headers)
            .map_err(|_| ReportError::Transport)?;
        request
            .write_all(body.as_bytes())
            .map_err(|_| ReportError::Transport)?;
        let response = request.submit().map_err(|e| {
            warn!("report: HTTP POST failed: {:?}", e);
            ReportError::Transport
        })?;

        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(ReportError::Rejected(status));
        }
        Ok(())
    }

    /// Host builds have no network stack.
    #[cfg(not(target_os = "espidf"))]
    fn post(&self, _body: &str) -> Result<(), ReportError> {
        Err(ReportError::Transport)
    }
}

impl ReportPort for HttpReporter {
    fn flush(&mut self, entries: &[QueueEntry]) -> Result<(), ReportError> {
        if !self.has_token() {
            info!("report: no valid token set, not sending");
            return Err(ReportError::NoToken);
        }
        let body = build_payload(entries)?;
        debug!("report: payload {} bytes: {}", body.len(), body);
        self.post(&body)?;
        self.reports_sent = self.reports_sent.wrapping_add(1);
        info!("report: {} value(s) accepted", entries.len());
        Ok(())
    }
}
