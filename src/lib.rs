//! EnvStation firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod display;
pub mod error;
pub mod heater;
pub mod measurement;
pub mod queue;
pub mod scheduler;
pub mod snapshot;
pub mod status;
pub mod watchdog;

// Adapters and drivers compile on the host too; the actual hardware
// paths are guarded by cfg attributes inside.
pub mod adapters;
pub mod sensors;
