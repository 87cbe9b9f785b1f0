use std::collections::VecDeque;

use crate::error::EmptyQueue;
use crate::process::ProcessId;

/// Processes that have arrived but are not yet in memory, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdmissionQueue {
    entries: VecDeque<ProcessId>,
}

impl AdmissionQueue {
    /// An empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a newly arrived process at the tail
    pub fn enqueue(&mut self, process_id: ProcessId) {
        self.entries.push_back(process_id);
    }

    /// Remove the head of the queue.
    ///
    /// Callers are expected to check [`is_empty`](Self::is_empty) first.
    pub fn dequeue(&mut self) -> Result<ProcessId, EmptyQueue> {
        self.entries.pop_front().ok_or(EmptyQueue)
    }

    /// Head of the queue without removing it
    pub fn front(&self) -> Option<ProcessId> {
        self.entries.front().copied()
    }

    /// True if nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of waiting processes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Waiting process ids, head first
    pub fn iter(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.entries.iter().copied()
    }

    /// Snapshot of the queue, head first
    pub fn to_vec(&self) -> Vec<ProcessId> {
        self.iter().collect()
    }
}
