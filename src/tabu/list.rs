//! Fixed-window FIFO tabu list.

use std::collections::VecDeque;

/// FIFO of recently toggled indices with a constant number of slots.
///
/// Every push evicts the oldest slot, so the window length never changes.
/// A slot that recorded no move holds `None`. Membership is answered from
/// per-index occurrence counts in `O(1)`.
#[derive(Debug, Clone)]
pub struct TabuList {
    slots: VecDeque<Option<usize>>,
    occurrences: Vec<u32>,
}

impl TabuList {
    /// Creates a list of `capacity` empty slots over indices `0..size`.
    pub fn new(capacity: usize, size: usize) -> Self {
        Self {
            slots: std::iter::repeat(None).take(capacity).collect(),
            occurrences: vec![0; size],
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Whether `index` occupies any slot.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.occurrences[index] > 0
    }

    /// Evicts the oldest slot and appends `entry`.
    pub fn push(&mut self, entry: Option<usize>) {
        if self.slots.is_empty() {
            return;
        }
        if let Some(Some(evicted)) = self.slots.pop_front() {
            self.occurrences[evicted] -= 1;
        }
        if let Some(index) = entry {
            self.occurrences[index] += 1;
        }
        self.slots.push_back(entry);
    }

    /// Empties every slot, keeping the window length.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.occurrences.iter_mut().for_each(|c| *c = 0);
    }

    /// Slots from oldest to newest.
    pub fn slots(&self) -> impl Iterator<Item = Option<usize>> + '_ {
        self.slots.iter().copied()
    }
}
