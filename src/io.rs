use std::fs;
use std::path::Path;
use std::str::{FromStr, SplitWhitespace};

use crate::error::{ParseError, SimError};
use crate::process::{Process, ProcessId, ProcessTable};

/// Processes read from a workload file, in file order.
///
/// The format is a stream of whitespace-separated integers; line breaks
/// carry no meaning:
///
/// ```text
/// N
/// id arrival lifetime k size_1 .. size_k    (N times)
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Workload {
    pub processes: Vec<Process>,
}

impl Workload {
    /// Read and parse a workload file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse workload text. Ids are checked for uniqueness by [`into_table`](Self::into_table).
    pub fn parse(content: &str) -> Result<Self, ParseError> {
        let mut tokens = Tokens::new(content);
        if tokens.is_exhausted() {
            return Err(ParseError::Empty);
        }

        let count: usize = tokens.next_field("process count", 0)?;
        let mut processes = Vec::with_capacity(count.min(1024));
        for index in 1..=count {
            processes.push(Self::parse_record(&mut tokens, index)?);
        }

        let trailing = tokens.remaining();
        if trailing > 0 {
            return Err(ParseError::TrailingTokens { count: trailing });
        }

        Ok(Workload { processes })
    }

    fn parse_record(tokens: &mut Tokens<'_>, index: usize) -> Result<Process, ParseError> {
        let id: ProcessId = tokens.next_field("process id", index)?;
        if id == 0 {
            return Err(ParseError::ZeroId { index });
        }
        let arrival_tick: u64 = tokens.next_field("arrival time", index)?;
        let lifetime: u64 = tokens.next_field("lifetime", index)?;
        if lifetime == 0 {
            return Err(ParseError::ZeroLifetime { id });
        }

        let segment_count: usize = tokens.next_field("segment count", index)?;
        if segment_count == 0 {
            return Err(ParseError::NoSegments { id });
        }

        let mut segments = Vec::with_capacity(segment_count.min(64));
        for _ in 0..segment_count {
            let size: u64 = tokens.next_field("segment size", index)?;
            if size == 0 {
                return Err(ParseError::ZeroSegment { id });
            }
            segments.push(size);
        }

        Ok(Process::new(id, arrival_tick, lifetime, segments))
    }

    /// Index the processes for the simulation. Fails on duplicate ids.
    pub fn into_table(self) -> Result<ProcessTable, SimError> {
        ProcessTable::new(self.processes)
    }
}

struct Tokens<'a> {
    inner: std::iter::Peekable<SplitWhitespace<'a>>,
}

impl<'a> Tokens<'a> {
    fn new(content: &'a str) -> Self {
        Tokens { inner: content.split_whitespace().peekable() }
    }

    fn is_exhausted(&mut self) -> bool {
        self.inner.peek().is_none()
    }

    fn remaining(self) -> usize {
        self.inner.count()
    }

    fn next_field<T: FromStr>(&mut self, field: &'static str, index: usize) -> Result<T, ParseError> {
        let token = self
            .inner
            .next()
            .ok_or(ParseError::UnexpectedEof { field, index })?;
        token.parse().map_err(|_| ParseError::InvalidNumber {
            field,
            token: token.to_string(),
        })
    }
}
