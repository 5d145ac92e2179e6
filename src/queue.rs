//! Submission queue with priority-merge semantics.
//!
//! Holds at most one entry per [`Quantity`].  Enqueueing a value for a
//! quantity that is already queued keeps whichever entry has the higher
//! priority; on a tie the first-seen entry stays.  The losing value is
//! dropped silently.
//!
//! Capacity is bounded by [`Quantity::COUNT`], so the queue lives on the
//! stack and never reallocates.

use heapless::Vec;
use log::debug;

use crate::measurement::Quantity;

/// One pending value awaiting upstream submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueEntry {
    pub quantity: Quantity,
    pub value: f32,
    pub priority: u8,
}

/// Per-cycle collection of values to report.
#[derive(Debug, Default)]
pub struct SubmissionQueue {
    entries: Vec<QueueEntry, { Quantity::COUNT }>,
}

impl SubmissionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry.  Called once at the start of each measurement cycle.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Queue `value` for `quantity`, merging by priority.
    ///
    /// Returns `true` if the queue changed.
    pub fn enqueue(&mut self, quantity: Quantity, value: f32, priority: u8) -> bool {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.quantity == quantity) {
            if existing.priority >= priority {
                debug!(
                    "queue: dropped {} (prio {} <= {})",
                    quantity.key(),
                    priority,
                    existing.priority
                );
                return false;
            }
            existing.value = value;
            existing.priority = priority;
            return true;
        }

        // One slot per quantity, so this cannot overflow.
        self.entries
            .push(QueueEntry {
                quantity,
                value,
                priority,
            })
            .is_ok()
    }

    /// Queued entries in first-insertion order.
    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// Queued value for `quantity`, if any.
    pub fn get(&self, quantity: Quantity) -> Option<f32> {
        self.entries
            .iter()
            .find(|e| e.quantity == quantity)
            .map(|e| e.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_priority_replaces_in_place() {
        let mut q = SubmissionQueue::new();
        q.enqueue(Quantity::Pressure, 1000.0, 1);
        q.enqueue(Quantity::Temperature, 18.0, 10);
        assert!(q.enqueue(Quantity::Temperature, 21.0, 100));

        assert_eq!(q.len(), 2);
        assert_eq!(q.entries()[1].quantity, Quantity::Temperature);
        assert_eq!(q.entries()[1].value, 21.0);
        assert_eq!(q.entries()[1].priority, 100);
    }

    #[test]
    fn equal_or_lower_priority_is_dropped() {
        let mut q = SubmissionQueue::new();
        q.enqueue(Quantity::Humidity, 60.0, 100);
        assert!(!q.enqueue(Quantity::Humidity, 99.0, 100));
        assert!(!q.enqueue(Quantity::Humidity, 12.0, 10));
        assert_eq!(q.get(Quantity::Humidity), Some(60.0));
    }

    #[test]
    fn clear_empties_queue() {
        let mut q = SubmissionQueue::new();
        for (i, quantity) in Quantity::ALL.iter().enumerate() {
            q.enqueue(*quantity, i as f32, 1);
        }
        assert_eq!(q.len(), Quantity::COUNT);
        q.clear();
        assert!(q.is_empty());
        assert!(q.entries().is_empty());
    }

    #[test]
    fn every_quantity_fits() {
        let mut q = SubmissionQueue::new();
        for quantity in Quantity::ALL {
            assert!(q.enqueue(quantity, 1.0, 1));
        }
        assert_eq!(q.len(), Quantity::COUNT);
    }
}
