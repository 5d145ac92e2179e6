//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the control loop of the station: measurement
//! cadence, snapshot publication, heater hysteresis, report queueing,
//! submission watchdog and display rotation.  All interaction with
//! hardware and the network happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod auth;
pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
