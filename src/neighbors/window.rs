use std::collections::VecDeque;

/// A buffered labelled instance.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowEntry {
    pub x: Vec<f64>,
    pub y: f64,
    /// Position of the instance in the sequence of all insertions.
    pub seq: u64,
}

/// Fixed capacity FIFO buffer. Pushing past the capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct InstanceWindow {
    entries: VecDeque<WindowEntry>,
    capacity: usize,
    next_seq: u64,
}

impl InstanceWindow {
    pub fn new(capacity: usize) -> Self {
        InstanceWindow {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_seq: 0,
        }
    }

    /// Insert an instance, returning the evicted one if the window was full.
    pub fn push(&mut self, x: &[f64], y: f64) -> Option<WindowEntry> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(WindowEntry {
            x: x.to_vec(),
            y,
            seq: self.next_seq,
        });
        self.next_seq += 1;
        evicted
    }

    /// Drop the `n` oldest entries.
    pub fn evict_oldest(&mut self, n: usize) {
        let n = n.min(self.entries.len());
        self.entries.drain(..n);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn oldest(&self) -> Option<&WindowEntry> {
        self.entries.front()
    }

    /// Entries from the oldest to the newest.
    pub fn iter(&self) -> impl Iterator<Item = &WindowEntry> {
        self.entries.iter()
    }
}
