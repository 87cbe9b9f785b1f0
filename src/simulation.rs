//! Discrete-event clock driving arrivals, completions and admissions.
//!
//! Every tick runs the same fixed sequence:
//!
//! 1. processes arriving at this tick join the admission queue (table order)
//! 2. running processes whose lifetime has elapsed release their frames
//! 3. the queue is drained into memory until the head no longer fits
//! 4. the clock advances by one
//!
//! A process's lifetime is counted from the tick it was admitted, not from
//! its arrival. Turnaround is completion tick minus arrival tick.

use log::{debug, info, trace, warn};

use crate::config::{SimConfig, Termination};
use crate::constants::FIRST_TICK;
use crate::error::SimError;
use crate::memory::{MemoryUsage, PageAllocator, Span, Spans};
use crate::process::{Process, ProcessId, ProcessTable, RunningProcess};
use crate::scheduler::AdmissionQueue;

/// Where a process is in its lifecycle. Exactly one at any tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Arrival tick not reached yet
    Pending,
    Queued,
    Running(RunningProcess),
    Completed { completion_tick: u64 },
}

/// Something that happened during a tick, with read-only snapshots taken
/// right after it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Arrived {
        process_id: ProcessId,
        queue: Vec<ProcessId>,
    },
    Completed {
        process_id: ProcessId,
        turnaround: u64,
        memory: Vec<Span>,
    },
    Admitted {
        process_id: ProcessId,
        queue: Vec<ProcessId>,
        memory: Vec<Span>,
    },
}

/// Events produced by one call to [`Simulation::step`], in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub events: Vec<Event>,
}

impl TickReport {
    /// True if nothing happened during the tick
    pub fn is_quiet(&self) -> bool {
        self.events.is_empty()
    }
}

/// Average turnaround of a run, or the explicit absence of one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Turnaround {
    Average(f64),
    NoCompletions,
}

/// Aggregate statistics of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub completed: usize,
    pub total_turnaround: u64,
    /// Number of ticks processed
    pub ticks: u64,
    pub peak_used_pages: usize,
}

impl Summary {
    /// Mean turnaround over completed processes; never divides by zero
    pub fn average_turnaround(&self) -> Turnaround {
        if self.completed == 0 {
            return Turnaround::NoCompletions;
        }
        Turnaround::Average(self.total_turnaround as f64 / self.completed as f64)
    }
}

/// Owns every piece of mutable simulation state.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    processes: ProcessTable,
    states: Vec<ProcessState>,
    allocator: PageAllocator,
    queue: AdmissionQueue,
    tick: u64,
    completed: usize,
    total_turnaround: u64,
    peak_used_pages: usize,
}

impl Simulation {
    /// Start at the first tick with empty memory and every process pending
    pub fn new(config: SimConfig, processes: ProcessTable) -> Self {
        Simulation {
            allocator: PageAllocator::new(&config.memory),
            states: vec![ProcessState::Pending; processes.len()],
            processes,
            config,
            queue: AdmissionQueue::new(),
            tick: FIRST_TICK,
            completed: 0,
            total_turnaround: 0,
            peak_used_pages: 0,
        }
    }

    /// Build a simulation straight from a list of processes
    pub fn from_processes(config: SimConfig, processes: Vec<Process>) -> Result<Self, SimError> {
        Ok(Self::new(config, ProcessTable::new(processes)?))
    }

    /// The tick the next call to [`step`](Self::step) will process
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Configuration the run was started with
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Every process of the workload, in input order
    pub fn processes(&self) -> &ProcessTable {
        &self.processes
    }

    /// Read-only view of the frame table owner
    pub fn allocator(&self) -> &PageAllocator {
        &self.allocator
    }

    /// Processes waiting for memory, head first
    pub fn queue(&self) -> &AdmissionQueue {
        &self.queue
    }

    /// Current memory map
    pub fn memory(&self) -> Spans<'_> {
        self.allocator.describe()
    }

    /// Current fragmentation snapshot
    pub fn usage(&self) -> MemoryUsage {
        self.allocator.usage()
    }

    /// Lifecycle state of a process, `None` for unknown ids
    pub fn state_of(&self, process_id: ProcessId) -> Option<ProcessState> {
        self.processes.slot_of(process_id).map(|slot| self.states[slot])
    }

    /// Processes currently in memory, in table order
    pub fn running(&self) -> impl Iterator<Item = RunningProcess> + '_ {
        self.states.iter().filter_map(|state| match *state {
            ProcessState::Running(running) => Some(running),
            _ => None,
        })
    }

    /// True once every process has completed
    pub fn is_finished(&self) -> bool {
        self.completed == self.processes.len()
    }

    /// Ids of processes that have not completed, in table order
    pub fn pending(&self) -> Vec<ProcessId> {
        self.processes
            .iter()
            .zip(&self.states)
            .filter(|(_, state)| !matches!(state, ProcessState::Completed { .. }))
            .map(|(process, _)| process.id)
            .collect()
    }

    /// Statistics accumulated so far
    pub fn summary(&self) -> Summary {
        Summary {
            completed: self.completed,
            total_turnaround: self.total_turnaround,
            ticks: self.tick - FIRST_TICK,
            peak_used_pages: self.peak_used_pages,
        }
    }

    /// Process one tick and advance the clock.
    pub fn step(&mut self) -> TickReport {
        let tick = self.tick;
        let mut events = Vec::new();

        self.inject_arrivals(tick, &mut events);
        self.retire_completed(tick, &mut events);
        self.drain_queue(tick, &mut events);

        self.peak_used_pages = self.peak_used_pages.max(self.usage().used_pages);
        self.tick += 1;

        TickReport { tick, events }
    }

    /// Step until the termination policy is met or the tick bound is passed.
    pub fn run(&mut self) -> Result<Summary, SimError> {
        self.run_with(|_| {})
    }

    /// Like [`run`](Self::run), handing every tick's report to `observer`.
    pub fn run_with<F>(&mut self, mut observer: F) -> Result<Summary, SimError>
    where
        F: FnMut(&TickReport),
    {
        let max_tick = self.config.max_tick;
        info!(
            "starting simulation: {} process(es), {} frame(s) of {} KB, max tick {}",
            self.processes.len(),
            self.allocator.total_pages(),
            self.allocator.page_size(),
            max_tick
        );

        while self.tick <= max_tick {
            let report = self.step();
            observer(&report);

            if self.config.termination == Termination::StopWhenIdle && self.is_finished() {
                break;
            }
            if report.tick == max_tick {
                break;
            }
        }

        let summary = self.summary();
        if !self.is_finished() {
            let pending = self.pending();
            warn!(
                "tick bound {} reached with {} unfinished process(es) ({} running, {} queued): {:?}",
                max_tick,
                pending.len(),
                self.running().count(),
                self.queue.len(),
                pending
            );
            return Err(SimError::DidNotTerminate { max_tick, pending, summary });
        }

        info!(
            "simulation finished after {} tick(s), {} process(es) completed",
            summary.ticks, summary.completed
        );
        Ok(summary)
    }

    fn inject_arrivals(&mut self, tick: u64, events: &mut Vec<Event>) {
        let total_pages = self.allocator.total_pages();
        let page_size = self.allocator.page_size();

        for (slot, process) in self.processes.arrivals_at(tick) {
            match process.pages_needed(page_size) {
                Some(needed) if needed <= total_pages => {}
                needed => warn!(
                    "process {} needs {} page(s) but memory only has {}; it can never be admitted",
                    process.id,
                    needed.map_or_else(|| "too many".to_string(), |n| n.to_string()),
                    total_pages
                ),
            }

            self.states[slot] = ProcessState::Queued;
            self.queue.enqueue(process.id);
            debug!(
                "t={}: process {} arrives requesting {} KB",
                tick,
                process.id,
                process.memory_required()
            );
            events.push(Event::Arrived {
                process_id: process.id,
                queue: self.queue.to_vec(),
            });
        }
    }

    fn retire_completed(&mut self, tick: u64, events: &mut Vec<Event>) {
        for slot in 0..self.states.len() {
            let ProcessState::Running(running) = self.states[slot] else {
                continue;
            };
            let process = self.processes.by_slot(slot);
            if running.completion_tick(process.lifetime) != tick {
                continue;
            }

            let freed = self.allocator.release(process.id);
            let turnaround = tick - process.arrival_tick;
            self.states[slot] = ProcessState::Completed { completion_tick: tick };
            self.total_turnaround += turnaround;
            self.completed += 1;

            debug!(
                "t={}: process {} completes, {} frame(s) freed, turnaround {}",
                tick, process.id, freed, turnaround
            );
            events.push(Event::Completed {
                process_id: process.id,
                turnaround,
                memory: self.memory().collect(),
            });
        }
    }

    fn drain_queue(&mut self, tick: u64, events: &mut Vec<Event>) {
        while let Some(process_id) = self.queue.front() {
            let Some(slot) = self.processes.slot_of(process_id) else {
                break;
            };
            let process = self.processes.by_slot(slot);

            if !self.allocator.admit(process.id, &process.segments) {
                trace!(
                    "t={}: process {} blocked at the head of the queue ({} free frame(s), {} waiting)",
                    tick,
                    process_id,
                    self.allocator.free_frames(),
                    self.queue.len()
                );
                break;
            }

            let admitted = self.queue.dequeue();
            debug_assert_eq!(admitted, Ok(process_id));
            self.states[slot] = ProcessState::Running(RunningProcess {
                process_id,
                start_tick: tick,
            });

            debug!("t={}: process {} moved to memory", tick, process_id);
            events.push(Event::Admitted {
                process_id,
                queue: self.queue.to_vec(),
                memory: self.memory().collect(),
            });
        }
    }
}
