//! Human readable trace of a simulation run.

use std::io::{self, Write};

use crate::constants::{EVENT_INDENT, SPAN_INDENT};
use crate::memory::Span;
use crate::process::ProcessId;
use crate::simulation::{Event, Summary, TickReport, Turnaround};

/// Writes tick reports and the final summary to any writer.
pub struct Reporter<W: Write> {
    out: W,
}

impl<W: Write> Reporter<W> {
    /// Wrap a writer; nothing is written until the first call
    pub fn new(out: W) -> Self {
        Reporter { out }
    }

    /// Print every event of a tick under a `t = N:` header. Quiet ticks print nothing.
    pub fn tick(&mut self, report: &TickReport) -> io::Result<()> {
        if report.is_quiet() {
            return Ok(());
        }
        writeln!(self.out, "t = {}:", report.tick)?;

        for event in &report.events {
            match event {
                Event::Arrived { process_id, queue } => {
                    writeln!(self.out, "{EVENT_INDENT}Process {process_id} arrives")?;
                    self.queue(queue)?;
                }
                Event::Completed { process_id, memory, .. } => {
                    writeln!(self.out, "{EVENT_INDENT}Process {process_id} completes")?;
                    self.memory_map(memory)?;
                    writeln!(self.out)?;
                }
                Event::Admitted { process_id, queue, memory } => {
                    writeln!(self.out, "{EVENT_INDENT}MM moves Process {process_id} to memory")?;
                    self.queue(queue)?;
                    self.memory_map(memory)?;
                    writeln!(self.out)?;
                }
            }
        }
        Ok(())
    }

    /// `Input Queue:[..]` line with ids head first
    pub fn queue(&mut self, queue: &[ProcessId]) -> io::Result<()> {
        let ids: Vec<String> = queue.iter().map(|id| id.to_string()).collect();
        writeln!(self.out, "{EVENT_INDENT}Input Queue:[{}]", ids.join(" "))
    }

    /// `Memory Map:` header followed by one line per span
    pub fn memory_map<'a, I>(&mut self, spans: I) -> io::Result<()>
    where
        I: IntoIterator<Item = &'a Span>,
    {
        writeln!(self.out, "{EVENT_INDENT}Memory Map:")?;
        for span in spans {
            write!(self.out, "{SPAN_INDENT}{}-{}: ", span.start_addr(), span.end_addr())?;
            match *span {
                Span::Free { .. } => writeln!(self.out, "Free frame(s)")?,
                Span::Owned { process_id, page_index, .. } => {
                    writeln!(self.out, "Process {process_id}, Page {page_index}")?
                }
            }
        }
        Ok(())
    }

    /// Final average turnaround line
    pub fn summary(&mut self, summary: &Summary) -> io::Result<()> {
        match summary.average_turnaround() {
            Turnaround::Average(avg) => writeln!(self.out, "Average Turnaround Time: {avg:.2}"),
            Turnaround::NoCompletions => writeln!(
                self.out,
                "No processes completed. Average Turnaround Time: N/A"
            ),
        }
    }

    /// Flush the underlying writer
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Recover the writer, e.g. a `Vec<u8>` buffer
    pub fn into_inner(self) -> W {
        self.out
    }
}
