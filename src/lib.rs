pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod memory;
pub mod process;
pub mod report;
pub mod scheduler;
pub mod simulation;

// Re-export commonly used items for convenience
pub use config::{MemoryConfig, SimConfig, Termination};
pub use error::{ConfigError, EmptyQueue, ParseError, SimError};
pub use memory::{Frame, MemoryUsage, PageAllocator, Span};
pub use process::{Process, ProcessId, ProcessTable, RunningProcess};
pub use scheduler::AdmissionQueue;
pub use simulation::{Event, ProcessState, Simulation, Summary, TickReport, Turnaround};
