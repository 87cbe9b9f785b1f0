//! Paging simulator - Main Entry Point
//!
//! Usage: paging-sim [OPTIONS] <WORKLOAD>
//!
//! Reads a workload of processes, runs them through a paged memory manager
//! tick by tick and prints the trace followed by the average turnaround.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{info, LevelFilter};
use thiserror::Error;

use paging_sim::constants::{DEFAULT_MAX_TICK, DEFAULT_PAGE_SIZE, DEFAULT_TOTAL_MEMORY};
use paging_sim::io::Workload;
use paging_sim::report::Reporter;
use paging_sim::{ConfigError, MemoryConfig, ParseError, SimConfig, SimError, Simulation, Termination};

/// Command-line configuration
#[derive(Parser, Debug)]
#[command(name = "paging-sim")]
#[command(about = "Simulate paged memory management for a workload of processes")]
#[command(version)]
struct Cli {
    /// Workload file (process count, then id arrival lifetime k size_1..size_k per process)
    workload: PathBuf,

    /// Total memory size in KB
    #[arg(long, default_value_t = DEFAULT_TOTAL_MEMORY)]
    memory: u64,

    /// Page size in KB (must divide the total memory)
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u64,

    /// Last tick to simulate before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_TICK)]
    max_tick: u64,

    /// Keep ticking until the bound even after every process has completed
    #[arg(long)]
    run_to_bound: bool,

    /// Write the trace to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print detailed progress information on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("invalid memory configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("failed to write trace: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Sim(SimError::DidNotTerminate { .. }) => ExitCode::from(2),
            _ => ExitCode::FAILURE,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Run the simulator and handle any errors
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn open_output(cli: &Cli) -> io::Result<Box<dyn Write>> {
    Ok(match &cli.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

/// Main logic separated from main() for cleaner error handling
fn run(cli: &Cli) -> Result<(), CliError> {
    // Step 1: Validate configuration before touching the workload
    let memory = MemoryConfig::new(cli.memory, cli.page_size)?;
    let termination = if cli.run_to_bound {
        Termination::RunToBound
    } else {
        Termination::StopWhenIdle
    };
    let config = SimConfig::new(memory)
        .with_max_tick(cli.max_tick)
        .with_termination(termination);

    // Step 2: Load the workload
    let workload = Workload::from_file(&cli.workload)?;
    let mut sim = Simulation::new(config, workload.into_table()?);
    info!(
        "loaded {} process(es) from {}, policy {:?}",
        sim.processes().len(),
        cli.workload.display(),
        sim.config().termination
    );

    // Step 3: Run, streaming every tick to the reporter
    let mut reporter = Reporter::new(open_output(cli)?);
    let mut write_result: io::Result<()> = Ok(());
    let outcome = sim.run_with(|report| {
        if write_result.is_ok() {
            write_result = reporter.tick(report);
        }
    });
    write_result?;

    // Step 4: Summary. A run that hit the tick bound still reports what completed.
    if let Ok(summary) | Err(SimError::DidNotTerminate { summary, .. }) = &outcome {
        reporter.summary(summary)?;
        let usage = sim.usage();
        info!(
            "peak usage {} of {} frame(s); final free holes {}, largest {}",
            summary.peak_used_pages, usage.total_pages, usage.free_holes, usage.largest_hole
        );
    }
    reporter.flush()?;

    outcome?;
    Ok(())
}
