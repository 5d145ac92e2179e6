//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements          | Connects to                  |
//! |----------------|---------------------|------------------------------|
//! | `hardware`     | SensorPort          | sensor hub (I2C/UART drivers)|
//! |                | HeaterPort, DelayNs | SHT4x heater, board delay    |
//! | `log_sink`     | EventSink           | Serial log output            |
//! | `log_display`  | DisplayPort         | Serial log output            |
//! | `nvs`          | ConfigPort          | NVS / in-memory store        |
//! | `report_http`  | ReportPort          | HTTPS push API               |
//! | `system`       | RestartPort         | esp_restart / OTA state      |
//! | `time`         | ClockPort           | SNTP wall clock, esp_timer   |

pub mod hardware;
pub mod log_display;
pub mod log_sink;
pub mod nvs;
pub mod report_http;
pub mod system;
pub mod time;
