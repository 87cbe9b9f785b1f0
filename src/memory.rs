use std::collections::HashMap;

use log::trace;

use crate::config::MemoryConfig;
use crate::process::ProcessId;

/// Frames needed to hold a segment of `size` KB.
///
/// `None` when the count does not fit in a `usize`.
#[inline]
pub fn pages_for(size: u64, page_size: u64) -> Option<usize> {
    usize::try_from(size.div_ceil(page_size)).ok()
}

/// Frames needed to hold every segment, each rounded up to whole pages.
///
/// `None` when the total does not fit in a `usize`; no memory pool can hold
/// such a request.
pub fn pages_for_segments(segments: &[u64], page_size: u64) -> Option<usize> {
    segments
        .iter()
        .try_fold(0usize, |total, &size| total.checked_add(pages_for(size, page_size)?))
}

/// State of one page frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Frame {
    #[default]
    Free,
    Owned(ProcessId),
}

impl Frame {
    /// True if no process owns the frame
    #[inline]
    pub fn is_free(&self) -> bool {
        matches!(self, Frame::Free)
    }

    /// Owning process, if any
    #[inline]
    pub fn owner(&self) -> Option<ProcessId> {
        match *self {
            Frame::Free => None,
            Frame::Owned(pid) => Some(pid),
        }
    }
}

/// One line of a memory map. Addresses are in KB and `end_addr` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    Free {
        start_addr: u64,
        end_addr: u64,
    },
    Owned {
        start_addr: u64,
        end_addr: u64,
        process_id: ProcessId,
        /// 1-based ordinal of this frame among the frames the process owns
        page_index: usize,
    },
}

impl Span {
    /// First address covered by the span
    pub fn start_addr(&self) -> u64 {
        match *self {
            Span::Free { start_addr, .. } | Span::Owned { start_addr, .. } => start_addr,
        }
    }

    /// Last address covered by the span (inclusive)
    pub fn end_addr(&self) -> u64 {
        match *self {
            Span::Free { end_addr, .. } | Span::Owned { end_addr, .. } => end_addr,
        }
    }
}

/// Fragmentation snapshot of the frame table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryUsage {
    pub total_pages: usize,
    pub used_pages: usize,
    pub free_pages: usize,
    /// Maximal runs of free frames
    pub free_holes: usize,
    pub largest_hole: usize,
}

/// Fixed-size frame allocator with all-or-nothing, first-fit admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAllocator {
    page_table: Vec<Frame>,
    page_size: u64,
}

impl PageAllocator {
    /// Create an allocator with every frame free
    pub fn new(config: &MemoryConfig) -> Self {
        PageAllocator {
            page_table: vec![Frame::Free; config.total_pages()],
            page_size: config.page_size(),
        }
    }

    /// Size of one frame in KB
    #[inline]
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Number of frames in the pool
    #[inline]
    pub fn total_pages(&self) -> usize {
        self.page_table.len()
    }

    /// Read-only view of the frame table, indexed by frame number
    pub fn frames(&self) -> &[Frame] {
        &self.page_table
    }

    /// Number of frames no process owns
    pub fn free_frames(&self) -> usize {
        self.frames().iter().filter(|f| f.is_free()).count()
    }

    /// Number of frames currently owned by `process_id`
    pub fn owned_by(&self, process_id: ProcessId) -> usize {
        self.frames()
            .iter()
            .filter(|f| f.owner() == Some(process_id))
            .count()
    }

    /// Claim frames for every segment of a process.
    ///
    /// Returns `false` without touching the table when there are not enough
    /// free frames in total. Otherwise each segment takes the first free
    /// frames found in ascending index order; they need not be contiguous.
    /// A request whose page count overflows can never fit and is refused.
    pub fn admit(&mut self, process_id: ProcessId, segments: &[u64]) -> bool {
        let Some(pages_needed) = pages_for_segments(segments, self.page_size) else {
            trace!("admit: process {} requests more pages than can be counted", process_id);
            return false;
        };
        let free = self.free_frames();

        if free < pages_needed {
            trace!(
                "admit: process {} needs {} page(s), {} free",
                process_id, pages_needed, free
            );
            return false;
        }

        for &size in segments {
            // Every segment fits in a usize once the total did
            let wanted = pages_for(size, self.page_size).unwrap_or(usize::MAX);
            let mut claimed = 0;

            for frame in self.page_table.iter_mut() {
                if claimed == wanted {
                    break;
                }
                if frame.is_free() {
                    *frame = Frame::Owned(process_id);
                    claimed += 1;
                }
            }

            // Unreachable after the free-frame check, but never leave a partial claim behind
            if claimed < wanted {
                self.release(process_id);
                return false;
            }
        }

        true
    }

    /// Free every frame owned by `process_id`. Unknown ids are a no-op.
    ///
    /// Returns the number of frames freed.
    pub fn release(&mut self, process_id: ProcessId) -> usize {
        let mut freed = 0;
        for frame in self.page_table.iter_mut() {
            if frame.owner() == Some(process_id) {
                *frame = Frame::Free;
                freed += 1;
            }
        }
        freed
    }

    /// Walk the frame table as a memory map.
    ///
    /// Free frames are merged into maximal ranges; every owned frame gets its
    /// own span. Calling this again starts a fresh walk.
    pub fn describe(&self) -> Spans<'_> {
        Spans {
            frames: &self.page_table,
            page_size: self.page_size,
            next: 0,
            page_counts: HashMap::new(),
        }
    }

    /// Used and free frame counts plus the shape of the free holes
    pub fn usage(&self) -> MemoryUsage {
        let mut usage = MemoryUsage {
            total_pages: self.total_pages(),
            ..MemoryUsage::default()
        };
        let mut run = 0;

        for frame in self.frames() {
            if frame.is_free() {
                usage.free_pages += 1;
                run += 1;
                continue;
            }
            usage.used_pages += 1;
            if run > 0 {
                usage.free_holes += 1;
                usage.largest_hole = usage.largest_hole.max(run);
                run = 0;
            }
        }
        if run > 0 {
            usage.free_holes += 1;
            usage.largest_hole = usage.largest_hole.max(run);
        }

        usage
    }
}

/// Lazy memory map produced by [`PageAllocator::describe`].
#[derive(Debug, Clone)]
pub struct Spans<'a> {
    frames: &'a [Frame],
    page_size: u64,
    next: usize,
    page_counts: HashMap<ProcessId, usize>,
}

impl Iterator for Spans<'_> {
    type Item = Span;

    fn next(&mut self) -> Option<Span> {
        let start = self.next;
        let frame = *self.frames.get(start)?;
        let start_addr = start as u64 * self.page_size;

        match frame {
            Frame::Owned(process_id) => {
                self.next += 1;
                let page_index = self.page_counts.entry(process_id).or_insert(0);
                *page_index += 1;
                Some(Span::Owned {
                    start_addr,
                    end_addr: start_addr + self.page_size - 1,
                    process_id,
                    page_index: *page_index,
                })
            }
            Frame::Free => {
                let run = self.frames[start..]
                    .iter()
                    .take_while(|f| f.is_free())
                    .count();
                self.next += run;
                Some(Span::Free {
                    start_addr,
                    end_addr: self.next as u64 * self.page_size - 1,
                })
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.frames.len() - self.next;
        (usize::from(remaining > 0), Some(remaining))
    }
}

impl std::iter::FusedIterator for Spans<'_> {}
