//! Property-based tests for paging-sim.
//!
//! Uses proptest to check allocator and clock invariants across random
//! memory geometries and workloads.

use std::collections::HashMap;

use paging_sim::{
    Event, MemoryConfig, PageAllocator, Process, ProcessId, ProcessState, SimConfig, Simulation,
};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Memory with 1-16 frames of 50, 100 or 200 KB
fn memory_config() -> impl Strategy<Value = MemoryConfig> {
    (1u64..=16, prop::sample::select(vec![50u64, 100, 200]))
        .prop_map(|(pages, page_size)| MemoryConfig::new(pages * page_size, page_size).unwrap())
}

fn segments() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(1u64..700, 1..4)
}

/// Up to 12 processes with ids 1..=n in table order
fn workload() -> impl Strategy<Value = Vec<Process>> {
    prop::collection::vec((0u64..20, 1u64..10, segments()), 0..12).prop_map(|records| {
        records
            .into_iter()
            .enumerate()
            .map(|(i, (arrival, lifetime, segments))| {
                Process::new(i as ProcessId + 1, arrival, lifetime, segments)
            })
            .collect()
    })
}

#[derive(Debug, Clone)]
enum Op {
    Admit(ProcessId, Vec<u64>),
    Release(ProcessId),
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        (1u32..6, segments()).prop_map(|(pid, segs)| Op::Admit(pid, segs)),
        (1u32..8).prop_map(Op::Release),
    ];
    prop::collection::vec(op, 1..40)
}

fn pages_needed(page_size: u64, segments: &[u64]) -> usize {
    segments.iter().map(|s| s.div_ceil(page_size) as usize).sum()
}

// ============================================================================
// Allocator Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_allocator_ownership_matches_admissions(config in memory_config(), ops in ops()) {
        let mut mm = PageAllocator::new(&config);
        let page_size = config.page_size();
        let mut resident: HashMap<ProcessId, usize> = HashMap::new();

        for op in ops {
            match op {
                Op::Admit(pid, segs) => {
                    // A resident process is never admitted twice by the clock
                    if resident.contains_key(&pid) {
                        continue;
                    }
                    let before = mm.clone();
                    let needed = pages_needed(page_size, &segs);
                    if mm.admit(pid, &segs) {
                        prop_assert!(needed <= before.free_frames());
                        resident.insert(pid, needed);
                    } else {
                        prop_assert!(needed > before.free_frames());
                        prop_assert_eq!(&mm, &before);
                    }
                }
                Op::Release(pid) => {
                    let freed = mm.release(pid);
                    prop_assert_eq!(freed, resident.remove(&pid).unwrap_or(0));
                }
            }

            for (&pid, &pages) in &resident {
                prop_assert_eq!(mm.owned_by(pid), pages);
            }
            let owned: usize = resident.values().sum();
            prop_assert_eq!(owned + mm.free_frames(), mm.total_pages());
        }
    }

    #[test]
    fn prop_admit_then_release_round_trips(
        config in memory_config(),
        ops in ops(),
        segs in segments()
    ) {
        let mut mm = PageAllocator::new(&config);
        for op in ops {
            match op {
                Op::Admit(pid, s) => { mm.admit(pid, &s); }
                Op::Release(pid) => { mm.release(pid); }
            }
        }

        // Use an id none of the random ops could have picked
        let before = mm.clone();
        mm.admit(100, &segs);
        mm.release(100);
        prop_assert_eq!(mm, before);
    }

    #[test]
    fn prop_describe_covers_memory_exactly(config in memory_config(), ops in ops()) {
        let mut mm = PageAllocator::new(&config);
        for op in ops {
            match op {
                Op::Admit(pid, s) => { mm.admit(pid, &s); }
                Op::Release(pid) => { mm.release(pid); }
            }
        }

        let spans: Vec<_> = mm.describe().collect();
        let mut next_addr = 0;
        for span in &spans {
            prop_assert_eq!(span.start_addr(), next_addr);
            prop_assert!(span.end_addr() >= span.start_addr());
            next_addr = span.end_addr() + 1;
        }
        prop_assert_eq!(next_addr, config.total_memory());

        // No two free spans are adjacent
        for pair in spans.windows(2) {
            let both_free = matches!(pair[0], paging_sim::Span::Free { .. })
                && matches!(pair[1], paging_sim::Span::Free { .. });
            prop_assert!(!both_free);
        }
        prop_assert_eq!(spans, mm.describe().collect::<Vec<_>>());
    }
}

// ============================================================================
// Clock Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_clock_invariants_hold_every_tick(config in memory_config(), processes in workload()) {
        let page_size = config.page_size();
        let needs: HashMap<ProcessId, usize> = processes
            .iter()
            .map(|p| (p.id, pages_needed(page_size, &p.segments)))
            .collect();
        let mut sim = Simulation::from_processes(SimConfig::new(config), processes).unwrap();

        let mut arrived = Vec::new();
        let mut admitted = Vec::new();

        for _ in 0..150 {
            let report = sim.step();
            for event in &report.events {
                match event {
                    Event::Arrived { process_id, .. } => arrived.push(*process_id),
                    Event::Admitted { process_id, .. } => admitted.push(*process_id),
                    Event::Completed { .. } => {}
                }
            }

            let mut owned_total = 0;
            for (&pid, &need) in &needs {
                let owned = sim.allocator().owned_by(pid);
                match sim.state_of(pid) {
                    Some(ProcessState::Running(_)) => prop_assert_eq!(owned, need),
                    _ => prop_assert_eq!(owned, 0),
                }
                owned_total += owned;
            }
            prop_assert!(owned_total <= sim.allocator().total_pages());
            prop_assert_eq!(owned_total + sim.allocator().free_frames(), sim.allocator().total_pages());

            // Whatever is left at the head did not fit
            if let Some(head) = sim.queue().front() {
                prop_assert!(needs[&head] > sim.allocator().free_frames());
            }
        }

        // Admission order is arrival order
        prop_assert!(admitted.len() <= arrived.len());
        prop_assert_eq!(&admitted[..], &arrived[..admitted.len()]);
    }
}
