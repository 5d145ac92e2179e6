//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a subsystem through
//! the real adapters (simulated sensor drivers, in-memory NVS, console
//! display).  All tests run on the host with no real hardware required.

mod config_store_tests;
mod station_flow_tests;
mod support;
