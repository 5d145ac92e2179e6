//! Double-buffered snapshot of the latest readings.
//!
//! ```text
//!            active (AtomicUsize)
//!                  │
//!        ┌─────────▼────────┐   ┌──────────────────┐
//!        │  slot[active]    │   │  slot[1-active]  │
//!        │  readers copy    │   │  writer stages   │
//!        └──────────────────┘   └──────────────────┘
//!                  ▲                      │
//!                  └────── publish() ─────┘
//! ```
//!
//! The control loop is the single writer.  It stages a full record through
//! [`SnapshotWriter`] and publishes it by storing it into the inactive slot
//! and then flipping the active index.  Readers (status surface, display)
//! copy the active slot under a critical section, so a reader always gets
//! either the complete previous record or the complete new one.

use core::cell::Cell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicUsize, Ordering};

use embassy_sync::blocking_mutex::CriticalSectionMutex;

use crate::measurement::Quantity;

/// Sentinel for "no CO2 reading this cycle" (the sensor reports `u16`).
pub const CO2_ABSENT: u16 = 0xFFFF;

/// One complete set of readings plus timestamps.
///
/// Absent floating readings are `NaN`; absent CO2 is [`CO2_ABSENT`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    /// Wall-clock seconds of the measurement cycle that produced this record.
    pub last_update: i64,
    /// Wall-clock seconds of the most recent heater activation before this
    /// measurement.
    pub last_heater: i64,
    pub temperature: f32,
    pub humidity: f32,
    pub pressure: f32,
    pub rain: f32,
    pub co2: u16,
    pub pm010: f32,
    pub pm025: f32,
    pub pm040: f32,
    pub pm100: f32,
}

impl Snapshot {
    /// A record with every reading absent.
    pub const fn empty() -> Self {
        Self {
            last_update: 0,
            last_heater: 0,
            temperature: f32::NAN,
            humidity: f32::NAN,
            pressure: f32::NAN,
            rain: f32::NAN,
            co2: CO2_ABSENT,
            pm010: f32::NAN,
            pm025: f32::NAN,
            pm040: f32::NAN,
            pm100: f32::NAN,
        }
    }

    /// Mark every reading absent, keeping the timestamps.
    pub fn clear_readings(&mut self) {
        *self = Self {
            last_update: self.last_update,
            last_heater: self.last_heater,
            ..Self::empty()
        };
    }

    /// Store `value` for `quantity`.  CO2 is rounded to whole ppm.
    pub fn set(&mut self, quantity: Quantity, value: f32) {
        match quantity {
            Quantity::Temperature => self.temperature = value,
            Quantity::Humidity => self.humidity = value,
            Quantity::Pressure => self.pressure = value,
            Quantity::Rain => self.rain = value,
            Quantity::Co2 => {
                // 0xFFFF is reserved for "absent".
                self.co2 = if value.is_finite() && value >= 0.0 {
                    value.round().min(f32::from(CO2_ABSENT - 1)) as u16
                } else {
                    CO2_ABSENT
                };
            }
            Quantity::Pm010 => self.pm010 = value,
            Quantity::Pm025 => self.pm025 = value,
            Quantity::Pm040 => self.pm040 = value,
            Quantity::Pm100 => self.pm100 = value,
        }
    }

    /// Reading for `quantity`, or `None` if absent this cycle.
    pub fn get(&self, quantity: Quantity) -> Option<f32> {
        let value = match quantity {
            Quantity::Temperature => self.temperature,
            Quantity::Humidity => self.humidity,
            Quantity::Pressure => self.pressure,
            Quantity::Rain => self.rain,
            Quantity::Co2 => {
                return (self.co2 != CO2_ABSENT).then_some(f32::from(self.co2));
            }
            Quantity::Pm010 => self.pm010,
            Quantity::Pm025 => self.pm025,
            Quantity::Pm040 => self.pm040,
            Quantity::Pm100 => self.pm100,
        };
        (!value.is_nan()).then_some(value)
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Store
// ═══════════════════════════════════════════════════════════════

/// Two-slot snapshot store: one active slot for readers, one staging slot
/// for the writer.
pub struct SnapshotStore {
    slots: [CriticalSectionMutex<Cell<Snapshot>>; 2],
    active: AtomicUsize,
}

impl SnapshotStore {
    pub const fn new() -> Self {
        Self {
            slots: [
                CriticalSectionMutex::new(Cell::new(Snapshot::empty())),
                CriticalSectionMutex::new(Cell::new(Snapshot::empty())),
            ],
            active: AtomicUsize::new(0),
        }
    }

    /// Copy of the currently published record.  Safe from any context.
    pub fn current(&self) -> Snapshot {
        let idx = self.active.load(Ordering::Acquire);
        self.slots[idx].lock(Cell::get)
    }

    /// Start writing the inactive slot.
    ///
    /// The staged record starts as a copy of the inactive slot's previous
    /// contents; the writer is expected to overwrite every field.  Only the
    /// control loop may call this.
    pub fn begin_write(&self) -> SnapshotWriter<'_> {
        let target = 1 - self.active.load(Ordering::Acquire);
        let staged = self.slots[target].lock(Cell::get);
        SnapshotWriter {
            store: self,
            target,
            staged,
        }
    }

    /// Index of the slot readers currently see (diagnostics only).
    pub fn active_index(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive staging handle for the inactive slot.
///
/// Dropping the writer without calling [`publish`](Self::publish) discards
/// the staged record; readers never see it.
pub struct SnapshotWriter<'a> {
    store: &'a SnapshotStore,
    target: usize,
    staged: Snapshot,
}

impl SnapshotWriter<'_> {
    /// Commit the staged record and make it the active one.
    ///
    /// The previously active slot becomes the next write target.
    pub fn publish(self) {
        let record = self.staged;
        self.store.slots[self.target].lock(|cell| cell.set(record));
        self.store.active.store(self.target, Ordering::Release);
    }
}

impl Deref for SnapshotWriter<'_> {
    type Target = Snapshot;

    fn deref(&self) -> &Snapshot {
        &self.staged
    }
}

impl DerefMut for SnapshotWriter<'_> {
    fn deref_mut(&mut self) -> &mut Snapshot {
        &mut self.staged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn starts_empty() {
        let store = SnapshotStore::new();
        let snap = store.current();
        assert!(snap.temperature.is_nan());
        assert_eq!(snap.co2, CO2_ABSENT);
        for q in Quantity::ALL {
            assert_eq!(snap.get(q), None);
        }
    }

    #[test]
    fn staged_writes_invisible_until_publish() {
        let store = SnapshotStore::new();
        let mut w = store.begin_write();
        w.temperature = 21.0;
        w.last_update = 42;
        assert!(store.current().temperature.is_nan());

        w.publish();
        assert_eq!(store.current().temperature, 21.0);
        assert_eq!(store.current().last_update, 42);
    }

    #[test]
    fn publish_alternates_slots() {
        let store = SnapshotStore::new();
        assert_eq!(store.active_index(), 0);
        store.begin_write().publish();
        assert_eq!(store.active_index(), 1);
        store.begin_write().publish();
        assert_eq!(store.active_index(), 0);
    }

    #[test]
    fn dropped_writer_changes_nothing() {
        let store = SnapshotStore::new();
        {
            let mut w = store.begin_write();
            w.pressure = 1013.0;
        }
        assert_eq!(store.active_index(), 0);
        assert!(store.current().pressure.is_nan());
    }

    #[test]
    fn co2_sentinel_handling() {
        let mut snap = Snapshot::empty();
        snap.set(Quantity::Co2, 612.4);
        assert_eq!(snap.co2, 612);
        assert_eq!(snap.get(Quantity::Co2), Some(612.0));

        snap.set(Quantity::Co2, f32::NAN);
        assert_eq!(snap.get(Quantity::Co2), None);

        snap.set(Quantity::Co2, 1.0e9);
        assert_eq!(snap.co2, CO2_ABSENT - 1);
    }

    #[test]
    fn clear_readings_keeps_timestamps() {
        let mut snap = Snapshot::empty();
        snap.last_update = 100;
        snap.last_heater = 50;
        snap.set(Quantity::Humidity, 80.0);
        snap.clear_readings();
        assert_eq!(snap.last_update, 100);
        assert_eq!(snap.last_heater, 50);
        assert_eq!(snap.get(Quantity::Humidity), None);
    }

    #[test]
    fn concurrent_readers_never_see_torn_records() {
        let store = Arc::new(SnapshotStore::new());
        let done = Arc::new(AtomicBool::new(false));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let done = Arc::clone(&done);
                std::thread::spawn(move || {
                    let mut observed = 0u32;
                    while !done.load(Ordering::Acquire) {
                        let s = store.current();
                        if s.last_update == 0 {
                            continue;
                        }
                        let cycle = s.last_update as f32;
                        assert_eq!(s.last_heater, s.last_update);
                        assert_eq!(s.temperature, cycle);
                        assert_eq!(s.humidity, cycle);
                        assert_eq!(s.pressure, cycle);
                        assert_eq!(s.pm100, cycle);
                        observed += 1;
                    }
                    observed
                })
            })
            .collect();

        for cycle in 1..=2_000i64 {
            let mut w = store.begin_write();
            w.last_update = cycle;
            w.last_heater = cycle;
            for q in Quantity::ALL {
                w.set(q, cycle as f32);
            }
            w.publish();
        }
        done.store(true, Ordering::Release);

        for r in readers {
            r.join().expect("reader thread panicked");
        }
        assert_eq!(store.current().last_update, 2_000);
    }
}
