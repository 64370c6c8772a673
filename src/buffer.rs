use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// Bounded, thread-safe sliding window of raw intensity samples.
///
/// The camera-side producer appends, the estimation tick reads a full copy
/// through [`snapshot`](Self::snapshot). Both hold the lock only for the
/// duration of the copy or push, so appends stay O(1) amortized and a
/// reader can never observe a partially written sample.
#[derive(Debug)]
pub struct SignalBuffer {
    samples: Mutex<VecDeque<f32>>,
    capacity: usize,
}

impl SignalBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Appends a sample, evicting from the head while over capacity.
    pub fn append(&self, sample: f32) {
        let mut samples = self.lock();
        samples.push_back(sample);
        while samples.len() > self.capacity {
            samples.pop_front();
        }
    }

    /// Consistent copy of the current window, oldest first.
    pub fn snapshot(&self) -> Vec<f32> {
        self.lock().iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // The window holds plain floats with no cross-sample invariant, so a
    // poisoned lock is recovered instead of propagated.
    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<f32>> {
        self.samples.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn evicts_oldest_first_and_keeps_order() {
        let buffer = SignalBuffer::new(150);
        for i in 0..150 + 7 {
            buffer.append(i as f32);
        }
        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len(), 150);
        assert_eq!(snapshot[0], 7.0);
        assert_eq!(snapshot[149], 156.0);
        assert!(snapshot.windows(2).all(|w| w[1] == w[0] + 1.0));
    }

    #[test]
    fn never_exceeds_capacity() {
        let buffer = SignalBuffer::new(10);
        for i in 0..100 {
            buffer.append(i as f32);
            assert!(buffer.len() <= 10);
        }
    }

    #[test]
    fn clear_empties_window() {
        let buffer = SignalBuffer::new(10);
        buffer.append(1.0);
        buffer.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    fn concurrent_append_and_snapshot_stay_consistent() {
        let buffer = Arc::new(SignalBuffer::new(150));
        let writer = {
            let buffer = Arc::clone(&buffer);
            std::thread::spawn(move || {
                for i in 0..5_000 {
                    buffer.append(i as f32);
                }
            })
        };
        let reader = {
            let buffer = Arc::clone(&buffer);
            std::thread::spawn(move || {
                for _ in 0..1_000 {
                    let snapshot = buffer.snapshot();
                    assert!(snapshot.len() <= 150);
                    // Survivor order is preserved: consecutive appends stay
                    // consecutive in every snapshot.
                    assert!(snapshot.windows(2).all(|w| w[1] == w[0] + 1.0));
                }
            })
        };
        writer.join().unwrap();
        reader.join().unwrap();
    }
}
