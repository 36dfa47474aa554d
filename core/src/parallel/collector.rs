//! Lock-free bounded result collector

use crate::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// A fixed capacity array that many threads append to concurrently.
///
/// Each `push` claims a unique slot with a single atomic fetch-and-add and then
/// writes that slot only. Slots past the capacity are never written: the push
/// fails and the value is counted as dropped. Reading the results requires
/// exclusive access so every write has completed before `drain` observes it.
pub struct AtomicCollector<T> {
    /// Storage. A slot is written at most once between drains.
    slots: Vec<OnceLock<T>>,

    /// Next slot to claim. May run past `slots.len()` on overflow.
    cursor: AtomicUsize,

    /// Values rejected because the collector was full.
    dropped: AtomicUsize,
}

impl<T> AtomicCollector<T> {
    /// Returns a new collector that holds up to `capacity` values.
    ///
    /// * `capacity` - Maximum number of values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| OnceLock::new()).collect(),
            cursor: AtomicUsize::new(0),
            dropped: AtomicUsize::new(0),
        }
    }

    /// Returns the maximum number of values.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Appends a value and returns the slot index claimed for it.
    ///
    /// * `value` - The value.
    pub fn push(&self, value: T) -> Result<usize, Error> {
        let slot = self.cursor.fetch_add(1, Ordering::Relaxed);
        match self.slots.get(slot) {
            Some(cell) if cell.set(value).is_ok() => Ok(slot),
            _ => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Err(Error::CollectorFull {
                    capacity: self.slots.len(),
                })
            }
        }
    }

    /// Returns the number of slots claimed, capped at the capacity. While
    /// producers are running a claimed slot may not be written yet; the count
    /// equals the number of stored values once they have joined.
    pub fn len(&self) -> usize {
        self.cursor.load(Ordering::Acquire).min(self.slots.len())
    }

    /// Returns true if no slot has been claimed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of values rejected since the last drain.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Acquire)
    }

    /// Removes and returns the stored values in slot order and resets the
    /// collector for reuse. The dropped count is reset too.
    pub fn drain(&mut self) -> Vec<T> {
        let n = (*self.cursor.get_mut()).min(self.slots.len());
        let values = self.slots[..n].iter_mut().filter_map(OnceLock::take).collect();
        *self.cursor.get_mut() = 0;
        *self.dropped.get_mut() = 0;
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn push_assigns_sequential_slots() {
        let c = AtomicCollector::with_capacity(3);
        assert_eq!(c.push('a').ok(), Some(0));
        assert_eq!(c.push('b').ok(), Some(1));
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn overflow_is_rejected_and_counted() {
        let mut c = AtomicCollector::with_capacity(2);
        assert!(c.push(1).is_ok());
        assert!(c.push(2).is_ok());
        assert!(matches!(c.push(3), Err(Error::CollectorFull { capacity: 2 })));
        assert_eq!(c.len(), 2);
        assert_eq!(c.dropped(), 1);
        assert_eq!(c.drain(), vec![1, 2]);
        assert_eq!(c.dropped(), 0);
        assert!(c.is_empty());
    }

    #[test]
    fn claimed_slots_match_values_after_join() {
        let mut c = AtomicCollector::with_capacity(25);
        crossbeam::scope(|scope| {
            for t in 0..4 {
                let c = &c;
                scope.spawn(move |_| {
                    for i in 0..10 {
                        c.push(t * 10 + i).ok();
                    }
                });
            }
        })
        .unwrap();

        assert_eq!(c.len(), 25);
        assert_eq!(c.dropped(), 15);
        assert_eq!(c.drain().len(), 25);
    }

    #[test]
    fn drain_resets_for_reuse() {
        let mut c = AtomicCollector::with_capacity(4);
        c.push(10).ok();
        assert_eq!(c.drain(), vec![10]);
        assert_eq!(c.push(20).ok(), Some(0));
        assert_eq!(c.drain(), vec![20]);
    }

    #[test]
    fn zero_capacity_drops_everything() {
        let c = AtomicCollector::with_capacity(0);
        assert!(c.push(()).is_err());
        assert_eq!(c.dropped(), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn concurrent_slots_are_unique_and_dense(
            threads in 1..8usize,
            per_thread in 1..200usize,
            capacity in 1..1200usize,
        ) {
            let mut c = AtomicCollector::with_capacity(capacity);
            let claimed: Vec<usize> = crossbeam::scope(|scope| {
                let handles: Vec<_> = (0..threads)
                    .map(|t| {
                        let c = &c;
                        scope.spawn(move |_| {
                            (0..per_thread)
                                .filter_map(|i| c.push(t * per_thread + i).ok())
                                .collect::<Vec<usize>>()
                        })
                    })
                    .collect();
                handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
            })
            .unwrap();

            let total = threads * per_thread;
            let m = total.min(capacity);
            let unique: HashSet<usize> = claimed.iter().copied().collect();
            prop_assert_eq!(claimed.len(), m);
            prop_assert_eq!(unique, (0..m).collect::<HashSet<usize>>());
            prop_assert_eq!(c.dropped(), total - m);

            let values = c.drain();
            let distinct: HashSet<usize> = values.iter().copied().collect();
            prop_assert_eq!(values.len(), m);
            prop_assert_eq!(distinct.len(), m);
        }
    }
}
