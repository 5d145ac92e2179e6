//! Sensor subsystem: the driver trait and the aggregating [`SensorHub`].
//!
//! Each fitted physical sensor is one [`SensorDriver`].  The hub owns the
//! drivers, dispatches by [`SensorId`], and turns every driver error into
//! an absent reading: a single flaky sensor must not stall the control
//! loop or leak bus errors into the core.
//!
//! Register-level wire protocols live behind the trait; [`sim`] provides a
//! scriptable driver for host tests and bench builds without sensors.

pub mod sim;

use log::{debug, warn};

use crate::error::{Result, SensorError};
use crate::measurement::{Measurement, Quantity, SensorId};

/// One physical sensor.
pub trait SensorDriver: Send {
    fn id(&self) -> SensorId;

    /// Start a conversion.  Must not block for the conversion time.
    fn start_measurement(&mut self) -> Result<()>;

    /// Collect the result of the last conversion.
    fn read(&mut self) -> Result<Measurement>;

    /// Fire one heater pulse.  Only sensors with a heater support this.
    fn heat(&mut self) -> Result<()> {
        Err(SensorError::Unsupported.into())
    }
}

/// Physically plausible range per quantity.  Values outside are treated as
/// a failed read.
pub fn plausible_range(quantity: Quantity) -> (f32, f32) {
    match quantity {
        Quantity::Temperature => (-60.0, 90.0),
        Quantity::Humidity => (0.0, 100.0),
        Quantity::Pressure => (300.0, 1_200.0),
        Quantity::Rain => (0.0, 10_000.0),
        Quantity::Co2 => (0.0, 40_000.0),
        Quantity::Pm010 | Quantity::Pm025 | Quantity::Pm040 | Quantity::Pm100 => (0.0, 1_000.0),
    }
}

fn check_plausible(m: &Measurement) -> Result<()> {
    for s in m.samples() {
        let (lo, hi) = plausible_range(s.quantity);
        if !(lo..=hi).contains(&s.value) {
            return Err(SensorError::OutOfRange.into());
        }
    }
    Ok(())
}

/// Aggregates every fitted driver.
#[derive(Default)]
pub struct SensorHub {
    drivers: Vec<Box<dyn SensorDriver>>,
}

impl SensorHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a driver.  A second driver for the same sensor replaces the first.
    pub fn register(&mut self, driver: Box<dyn SensorDriver>) {
        let id = driver.id();
        self.drivers.retain(|d| d.id() != id);
        self.drivers.push(driver);
    }

    pub fn has(&self, sensor: SensorId) -> bool {
        self.drivers.iter().any(|d| d.id() == sensor)
    }

    fn driver_mut(&mut self, sensor: SensorId) -> Option<&mut Box<dyn SensorDriver>> {
        self.drivers.iter_mut().find(|d| d.id() == sensor)
    }

    /// Start a conversion on `sensor`.  Failures are logged and show up as
    /// an absent result on [`read`](Self::read).
    pub fn request(&mut self, sensor: SensorId) {
        match self.driver_mut(sensor) {
            Some(d) => {
                if let Err(e) = d.start_measurement() {
                    warn!("{}: start failed: {}", sensor.name(), e);
                }
            }
            None => debug!("{}: no driver registered", sensor.name()),
        }
    }

    /// Result of the last conversion, or `None` on any failure.
    pub fn read(&mut self, sensor: SensorId) -> Option<Measurement> {
        let driver = self.driver_mut(sensor)?;
        match driver.read().and_then(|m| check_plausible(&m).map(|()| m)) {
            Ok(m) => Some(m),
            Err(e) => {
                warn!("{}: read failed: {}", sensor.name(), e);
                None
            }
        }
    }

    /// Pulse the heater on the first sensor that has one.
    pub fn pulse_heater(&mut self) -> Result<()> {
        let driver = self
            .drivers
            .iter_mut()
            .find(|d| d.id().has_heater())
            .ok_or(SensorError::Unsupported)?;
        driver.heat()
    }
}
