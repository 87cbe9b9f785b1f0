use std::collections::HashMap;

use crate::error::SimError;
use crate::memory::pages_for_segments;

pub type ProcessId = u32;

/// A process description as loaded from the workload. Never mutated after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub id: ProcessId,
    pub arrival_tick: u64,
    pub lifetime: u64,
    /// Memory segment sizes in KB
    pub segments: Vec<u64>,
}

impl Process {
    pub fn new(id: ProcessId, arrival_tick: u64, lifetime: u64, segments: Vec<u64>) -> Self {
        Process { id, arrival_tick, lifetime, segments }
    }

    /// Total memory requested across all segments, in KB (saturating)
    pub fn memory_required(&self) -> u64 {
        self.segments.iter().fold(0, |total, &size| total.saturating_add(size))
    }

    /// Number of frames needed to hold every segment, each rounded up to whole pages.
    ///
    /// `None` when the count does not fit in a `usize`.
    pub fn pages_needed(&self, page_size: u64) -> Option<usize> {
        pages_for_segments(&self.segments, page_size)
    }
}

/// Recorded by the clock at the tick a process is admitted to memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunningProcess {
    pub process_id: ProcessId,
    pub start_tick: u64,
}

impl RunningProcess {
    /// Tick at which a process with `lifetime` leaves memory.
    ///
    /// Saturates at `u64::MAX`, which no bounded run ever reaches.
    #[inline]
    pub fn completion_tick(&self, lifetime: u64) -> u64 {
        self.start_tick.saturating_add(lifetime)
    }
}

/// Processes in input order, with lookup by id.
#[derive(Debug, Clone, Default)]
pub struct ProcessTable {
    processes: Vec<Process>,
    slots: HashMap<ProcessId, usize>,
}

impl ProcessTable {
    /// Build the table, rejecting duplicate ids.
    pub fn new(processes: Vec<Process>) -> Result<Self, SimError> {
        let mut slots = HashMap::with_capacity(processes.len());
        for (slot, process) in processes.iter().enumerate() {
            if slots.insert(process.id, slot).is_some() {
                return Err(SimError::DuplicateProcess(process.id));
            }
        }
        Ok(ProcessTable { processes, slots })
    }

    /// Position of a process in input order
    pub fn slot_of(&self, id: ProcessId) -> Option<usize> {
        self.slots.get(&id).copied()
    }

    /// Process at `slot`. Panics if `slot` is out of range, like slice indexing.
    pub fn by_slot(&self, slot: usize) -> &Process {
        &self.processes[slot]
    }

    /// All processes in input order
    pub fn iter(&self) -> std::slice::Iter<'_, Process> {
        self.processes.iter()
    }

    /// Processes whose arrival tick is `tick`, with their slots, in table order
    pub fn arrivals_at(&self, tick: u64) -> impl Iterator<Item = (usize, &Process)> {
        self.processes
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.arrival_tick == tick)
    }

    /// Number of processes in the table
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}
