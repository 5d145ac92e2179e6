//! Simulated sensor driver.
//!
//! Behaves like a real two-phase driver: `read` without a preceding
//! `start_measurement` fails with `NotReady`.  Results come from a script
//! of queued outcomes, then from a fixed fallback reading.  Heater pulses
//! are counted through a shared counter so tests can observe them after
//! handing the driver to a hub.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::{Result, SensorError};
use crate::measurement::{Measurement, SensorId};

use super::SensorDriver;

pub struct SimulatedSensor {
    id: SensorId,
    script: VecDeque<core::result::Result<Measurement, SensorError>>,
    fallback: Option<Measurement>,
    converting: bool,
    heat_pulses: Arc<AtomicU32>,
}

impl SimulatedSensor {
    /// A sensor that always returns `reading`.
    pub fn constant(id: SensorId, reading: Measurement) -> Self {
        Self {
            id,
            script: VecDeque::new(),
            fallback: Some(reading),
            converting: false,
            heat_pulses: Arc::new(AtomicU32::new(0)),
        }
    }

    /// A sensor that fails every read once the script is exhausted.
    pub fn scripted(id: SensorId) -> Self {
        Self {
            id,
            script: VecDeque::new(),
            fallback: None,
            converting: false,
            heat_pulses: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Queue the outcome of the next read.
    #[must_use]
    pub fn then(mut self, outcome: core::result::Result<Measurement, SensorError>) -> Self {
        self.script.push_back(outcome);
        self
    }

    /// Shared heater pulse counter.
    pub fn heat_counter(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.heat_pulses)
    }
}

impl SensorDriver for SimulatedSensor {
    fn id(&self) -> SensorId {
        self.id
    }

    fn start_measurement(&mut self) -> Result<()> {
        self.converting = true;
        Ok(())
    }

    fn read(&mut self) -> Result<Measurement> {
        if !core::mem::take(&mut self.converting) {
            return Err(SensorError::NotReady.into());
        }
        match self.script.pop_front() {
            Some(outcome) => outcome.map_err(Into::into),
            None => self
                .fallback
                .clone()
                .ok_or_else(|| SensorError::BusFailed.into()),
        }
    }

    fn heat(&mut self) -> Result<()> {
        if !self.id.has_heater() {
            return Err(SensorError::Unsupported.into());
        }
        self.heat_pulses.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
