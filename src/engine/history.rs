//! Bounded snapshot history
//!
//! Append-only ring of the most recent snapshots, owned by one loop
//! instance. Oldest entries are evicted first; there is no other
//! retention policy.

use crate::contracts::Snapshot;
use std::collections::VecDeque;

/// Default ring capacity
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// FIFO ring of recent snapshots
#[derive(Debug)]
pub struct HistoryBuffer {
    entries: VecDeque<Snapshot>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create a ring holding at most `capacity` snapshots
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a snapshot, evicting the oldest entry at capacity
    pub fn append(&mut self, snapshot: Snapshot) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    /// The last `k` snapshots in chronological order, capped to the
    /// current size
    pub fn recent(&self, k: usize) -> Vec<&Snapshot> {
        let start = self.entries.len().saturating_sub(k);
        self.entries.iter().skip(start).collect()
    }

    /// Most recent snapshot, if any
    pub fn latest(&self) -> Option<&Snapshot> {
        self.entries.back()
    }

    /// Number of retained snapshots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ring is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained snapshots
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{SignalSet, Verdict};

    fn snapshot(stress: f64) -> Snapshot {
        Snapshot::new(stress, 0.0, Verdict::safe(), SignalSet::new())
    }

    #[test]
    fn test_append_and_recent_order() {
        let mut history = HistoryBuffer::new(10);
        for i in 0..5 {
            history.append(snapshot(i as f64));
        }

        let recent = history.recent(3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].stress, 2.0);
        assert_eq!(recent[2].stress, 4.0);
    }

    #[test]
    fn test_recent_caps_to_size() {
        let mut history = HistoryBuffer::new(10);
        history.append(snapshot(1.0));
        assert_eq!(history.recent(100).len(), 1);
        assert!(HistoryBuffer::new(10).recent(5).is_empty());
    }

    #[test]
    fn test_eviction_keeps_newest_thousand() {
        let mut history = HistoryBuffer::default();
        for i in 1..=1500 {
            history.append(snapshot(i as f64));
        }

        assert_eq!(history.len(), 1000);
        let recent = history.recent(1000);
        // Snapshots #501..=#1500 survive, oldest first.
        assert_eq!(recent[0].stress, 501.0);
        assert_eq!(recent[999].stress, 1500.0);
        assert_eq!(history.latest().unwrap().stress, 1500.0);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut history = HistoryBuffer::new(0);
        history.append(snapshot(1.0));
        history.append(snapshot(2.0));
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().unwrap().stress, 2.0);
    }
}
