use crate::constants::*;
use crate::error::ConfigError;

/// Geometry of the memory pool, in KB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryConfig {
    total_memory: u64,
    page_size: u64,
}

impl MemoryConfig {
    /// Validate and build a memory geometry.
    ///
    /// Both sizes must be positive, the pool must split into whole pages, and
    /// the page count must stay within [`MAX_TOTAL_PAGES`].
    pub fn new(total_memory: u64, page_size: u64) -> Result<Self, ConfigError> {
        if total_memory == 0 {
            return Err(ConfigError::ZeroTotalMemory);
        }
        if page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if total_memory % page_size != 0 {
            return Err(ConfigError::NotPageAligned { total_memory, page_size });
        }
        let total_pages = total_memory / page_size;
        if total_pages > MAX_TOTAL_PAGES as u64 {
            return Err(ConfigError::TooManyPages {
                total_pages,
                max_pages: MAX_TOTAL_PAGES,
            });
        }
        Ok(MemoryConfig { total_memory, page_size })
    }

    /// Size of the whole pool in KB
    #[inline]
    pub fn total_memory(&self) -> u64 {
        self.total_memory
    }

    /// Size of one frame in KB
    #[inline]
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Number of frames; never above [`MAX_TOTAL_PAGES`]
    #[inline]
    pub fn total_pages(&self) -> usize {
        (self.total_memory / self.page_size) as usize
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        MemoryConfig {
            total_memory: DEFAULT_TOTAL_MEMORY,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// When the clock is allowed to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Termination {
    /// Stop after the tick in which the last process completes.
    #[default]
    StopWhenIdle,
    /// Always process every tick up to and including `max_tick`.
    RunToBound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    pub memory: MemoryConfig,
    pub max_tick: u64,
    pub termination: Termination,
}

impl SimConfig {
    /// Default tick bound and termination policy for the given geometry
    pub fn new(memory: MemoryConfig) -> Self {
        SimConfig {
            memory,
            ..Self::default()
        }
    }

    /// Last tick the clock may process
    pub fn with_max_tick(mut self, max_tick: u64) -> Self {
        self.max_tick = max_tick;
        self
    }

    /// When the clock may stop early
    pub fn with_termination(mut self, termination: Termination) -> Self {
        self.termination = termination;
        self
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            memory: MemoryConfig::default(),
            max_tick: DEFAULT_MAX_TICK,
            termination: Termination::default(),
        }
    }
}
