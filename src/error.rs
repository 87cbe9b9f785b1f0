//! Error types for the paging simulator.
//!
//! Capacity failures are not errors: `PageAllocator::admit` reports them
//! as `false` and the clock retries every tick.

use std::path::PathBuf;

use thiserror::Error;

use crate::process::ProcessId;
use crate::simulation::Summary;

/// Invalid memory geometry. Fatal at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("total memory must be greater than zero")]
    ZeroTotalMemory,

    #[error("page size must be greater than zero")]
    ZeroPageSize,

    #[error("total memory {total_memory} KB is not a multiple of the page size {page_size} KB")]
    NotPageAligned { total_memory: u64, page_size: u64 },

    #[error("memory would hold {total_pages} pages, more than the supported {max_pages}")]
    TooManyPages { total_pages: u64, max_pages: usize },
}

/// Malformed or unreadable workload. Fatal before the simulation starts.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to read workload file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("workload is empty")]
    Empty,

    #[error("invalid {field} `{token}`: expected a non-negative integer")]
    InvalidNumber { field: &'static str, token: String },

    #[error("unexpected end of input while reading {field} of process #{index}")]
    UnexpectedEof { field: &'static str, index: usize },

    #[error("found {count} unexpected token(s) after the last process record")]
    TrailingTokens { count: usize },

    #[error("process id must be greater than zero (record #{index})")]
    ZeroId { index: usize },

    #[error("process {id} has a lifetime of zero")]
    ZeroLifetime { id: ProcessId },

    #[error("process {id} declares no memory segments")]
    NoSegments { id: ProcessId },

    #[error("process {id} has a zero-sized segment")]
    ZeroSegment { id: ProcessId },
}

/// `dequeue` was called on an empty admission queue.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("attempt to dequeue from an empty admission queue")]
pub struct EmptyQueue;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("process id {0} appears more than once in the process table")]
    DuplicateProcess(ProcessId),

    #[error(
        "simulation did not terminate by tick {max_tick}: {} process(es) still pending",
        .pending.len()
    )]
    DidNotTerminate {
        max_tick: u64,
        pending: Vec<ProcessId>,
        summary: Summary,
    },
}
