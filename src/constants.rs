/// Size of the simulated memory pool in KB.
pub const DEFAULT_TOTAL_MEMORY: u64 = 2000;
/// Size of one page frame in KB.
pub const DEFAULT_PAGE_SIZE: u64 = 200;

/// Largest frame table the allocator will build.
pub const MAX_TOTAL_PAGES: usize = 1 << 24;

/// Last tick the clock is allowed to process.
pub const DEFAULT_MAX_TICK: u64 = 100_000;

pub const FIRST_TICK: u64 = 0;

pub const EVENT_INDENT: &str = "       ";
pub const SPAN_INDENT: &str = "                  ";
