//! End-to-end runs: workload text in, trace and summary out.

use paging_sim::io::Workload;
use paging_sim::report::Reporter;
use paging_sim::{
    Event, MemoryConfig, Process, ProcessState, SimConfig, SimError, Simulation, Summary,
    Termination, Turnaround,
};

fn run_trace(workload: &str, config: SimConfig) -> (String, Result<Summary, SimError>) {
    let table = Workload::parse(workload).unwrap().into_table().unwrap();
    let mut sim = Simulation::new(config, table);
    let mut reporter = Reporter::new(Vec::new());

    let outcome = sim.run_with(|report| reporter.tick(report).unwrap());
    if let Ok(summary) | Err(SimError::DidNotTerminate { summary, .. }) = &outcome {
        reporter.summary(summary).unwrap();
    }
    (String::from_utf8(reporter.into_inner()).unwrap(), outcome)
}

#[test]
fn test_single_process_trace() {
    let (trace, outcome) = run_trace("1\n1\n0 5\n1 450\n", SimConfig::default());

    let expected = "\
t = 0:
       Process 1 arrives
       Input Queue:[1]
       MM moves Process 1 to memory
       Input Queue:[]
       Memory Map:
                  0-199: Process 1, Page 1
                  200-399: Process 1, Page 2
                  400-599: Process 1, Page 3
                  600-1999: Free frame(s)

t = 5:
       Process 1 completes
       Memory Map:
                  0-1999: Free frame(s)

Average Turnaround Time: 5.00
";
    assert_eq!(trace, expected);

    let summary = outcome.unwrap();
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.total_turnaround, 5);
}

#[test]
fn test_second_process_waits_for_frames() {
    // 4 frames; A and B both need 3 and arrive together
    let config = SimConfig::new(MemoryConfig::new(800, 200).unwrap());
    let (trace, outcome) = run_trace("2\n1 0 4 1 600\n2 0 2 2 200 400\n", config);

    let expected = "\
t = 0:
       Process 1 arrives
       Input Queue:[1]
       Process 2 arrives
       Input Queue:[1 2]
       MM moves Process 1 to memory
       Input Queue:[2]
       Memory Map:
                  0-199: Process 1, Page 1
                  200-399: Process 1, Page 2
                  400-599: Process 1, Page 3
                  600-799: Free frame(s)

t = 4:
       Process 1 completes
       Memory Map:
                  0-799: Free frame(s)

       MM moves Process 2 to memory
       Input Queue:[]
       Memory Map:
                  0-199: Process 2, Page 1
                  200-399: Process 2, Page 2
                  400-599: Process 2, Page 3
                  600-799: Free frame(s)

t = 6:
       Process 2 completes
       Memory Map:
                  0-799: Free frame(s)

Average Turnaround Time: 5.00
";
    assert_eq!(trace, expected);
    assert_eq!(outcome.unwrap().completed, 2);
}

#[test]
fn test_interleaved_holes_and_page_numbers() {
    let config = SimConfig::new(MemoryConfig::new(500, 100).unwrap());
    let mut sim = Simulation::from_processes(config, vec![
        Process::new(1, 0, 2, vec![100]),
        Process::new(2, 0, 10, vec![100]),
        Process::new(3, 3, 4, vec![150, 100]),
    ])
    .unwrap();

    for _ in 0..3 {
        sim.step();
    }
    let report = sim.step();
    assert_eq!(report.tick, 3);

    // Process 3 reuses the hole left by process 1, then continues past process 2
    let Some(Event::Admitted { process_id: 3, memory, .. }) = report.events.last() else {
        panic!("expected process 3 to be admitted, got {:?}", report.events);
    };
    let mut trace = Reporter::new(Vec::new());
    trace.memory_map(memory).unwrap();
    let expected = "\
       Memory Map:
                  0-99: Process 3, Page 1
                  100-199: Process 2, Page 1
                  200-299: Process 3, Page 2
                  300-399: Process 3, Page 3
                  400-499: Free frame(s)
";
    assert_eq!(String::from_utf8(trace.into_inner()).unwrap(), expected);
}

#[test]
fn test_empty_workload_reports_no_completions() {
    let (trace, outcome) = run_trace("0", SimConfig::default());
    assert_eq!(trace, "No processes completed. Average Turnaround Time: N/A\n");
    assert_eq!(outcome.unwrap().average_turnaround(), Turnaround::NoCompletions);
}

#[test]
fn test_oversized_process_is_reported() {
    let config = SimConfig::new(MemoryConfig::new(400, 200).unwrap()).with_max_tick(50);
    let (trace, outcome) = run_trace("1\n7 2 3 1 5000\n", config);

    assert!(trace.starts_with("t = 2:\n       Process 7 arrives\n"));
    assert!(trace.ends_with("No processes completed. Average Turnaround Time: N/A\n"));

    let err = outcome.unwrap_err();
    assert!(err.to_string().contains("did not terminate by tick 50"));
    match err {
        SimError::DidNotTerminate { pending, summary, .. } => {
            assert_eq!(pending, vec![7]);
            assert_eq!(summary.completed, 0);
            assert_eq!(summary.ticks, 51);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_blocked_head_holds_back_smaller_process() {
    let config = SimConfig::new(MemoryConfig::new(400, 100).unwrap())
        .with_termination(Termination::RunToBound)
        .with_max_tick(40);
    let mut sim = Simulation::from_processes(config, vec![
        Process::new(1, 0, 10, vec![300]),
        Process::new(2, 1, 3, vec![400]),
        Process::new(3, 2, 3, vec![50]),
    ])
    .unwrap();

    for _ in 0..10 {
        let report = sim.step();
        assert!(
            !report
                .events
                .iter()
                .any(|e| matches!(e, Event::Admitted { process_id: 3, .. })),
            "process 3 jumped the queue at t={}",
            report.tick
        );
    }
    assert_eq!(sim.state_of(3), Some(ProcessState::Queued));

    let summary = sim.run().unwrap();
    // 1: 0..10, 2: 10..13, 3: 13..16
    assert_eq!(sim.state_of(3), Some(ProcessState::Completed { completion_tick: 16 }));
    assert_eq!(summary.total_turnaround, 10 + 12 + 14);
    assert_eq!(summary.ticks, 41);
}

#[test]
fn test_demo_workload_file() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/workload.txt");
    let table = Workload::from_file(path).unwrap().into_table().unwrap();
    let mut sim = Simulation::new(SimConfig::default(), table);

    let summary = sim.run().unwrap();
    // Turnarounds 5, 4, 5, 7
    assert_eq!(summary.completed, 4);
    assert_eq!(summary.total_turnaround, 21);
    assert_eq!(summary.average_turnaround(), Turnaround::Average(5.25));
    assert_eq!(summary.peak_used_pages, 10);
    assert_eq!(summary.ticks, 11);
}
