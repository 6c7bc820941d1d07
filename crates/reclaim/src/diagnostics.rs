//! Best-effort diagnostic side channel for deletion decisions.
//!
//! The decision function reports what it decided and why through an
//! injected [`DiagnosticSink`]. Sink failures are logged at debug level and
//! otherwise ignored; they never change a decision.

use crate::types::Item;
use crate::units::{format_signed_size, format_size, format_speed};
use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;

/// Which rule caused an item to be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Chosen by the reclamation solver in the urgent tier
    Reclaim,
    /// Complete and idle while in the light tier
    IdleComplete,
    /// Slow item purged while item state was unavailable
    Emergency,
}

impl Rule {
    /// Short label for display
    pub fn label(&self) -> &'static str {
        match self {
            Self::Reclaim => "reclaim",
            Self::IdleComplete => "idle-complete",
            Self::Emergency => "emergency",
        }
    }
}

/// Details reported when an item is selected for deletion.
#[derive(Debug, Clone)]
pub struct DeletionReport<'a> {
    /// The item being deleted
    pub item: &'a Item,
    /// Rule that selected it
    pub rule: Rule,
    /// Free space at decision time, if known
    pub free_space: Option<i64>,
    /// Number of candidates the solver planned over
    pub candidate_count: usize,
    /// Space the solver had to free, in weight units
    pub required_units: u64,
    /// Size of one weight unit in bytes
    pub weight_unit: u64,
}

/// A diagnostic event emitted by the decision function.
#[derive(Debug, Clone)]
pub enum Diagnostic<'a> {
    /// The snapshot had no item list or no free-space figure
    MissingState {
        /// Free space, if it could still be determined
        free_space: Option<i64>,
        /// Throughput below which items are purged
        threshold: u64,
    },
    /// An item was selected for deletion
    Deletion(DeletionReport<'a>),
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingState {
                free_space,
                threshold,
            } => {
                write!(
                    f,
                    "item state unavailable, purging items below {}",
                    format_speed(*threshold)
                )?;
                if let Some(free) = free_space {
                    write!(f, " (free {})", format_signed_size(*free))?;
                }
                Ok(())
            }
            Self::Deletion(report) => {
                write!(f, "delete '{}' [{}]", report.item.name, report.rule.label())?;
                if let Some(free) = report.free_space {
                    write!(f, " free={}", format_signed_size(free))?;
                }
                if report.rule == Rule::Reclaim {
                    write!(
                        f,
                        " candidates={} required={}",
                        report.candidate_count,
                        format_size(report.required_units.saturating_mul(report.weight_unit))
                    )?;
                }
                write!(
                    f,
                    " freed={} uploaded={} speed={}",
                    format_size(report.item.completed),
                    format_size(report.item.uploaded),
                    format_speed(report.item.upload_speed)
                )
            }
        }
    }
}

/// Receiver for diagnostic events.
pub trait DiagnosticSink {
    /// Record an event. Errors are swallowed by the caller.
    fn emit(&self, event: &Diagnostic<'_>) -> io::Result<()>;
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn emit(&self, _event: &Diagnostic<'_>) -> io::Result<()> {
        Ok(())
    }
}

/// Sink that forwards events to the `log` facade at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, event: &Diagnostic<'_>) -> io::Result<()> {
        match event {
            Diagnostic::MissingState { .. } => log::warn!("{event}"),
            Diagnostic::Deletion(_) => log::info!("{event}"),
        }
        Ok(())
    }
}

/// Sink that writes one line per event to a writer.
pub struct WriterSink<W: Write> {
    writer: Mutex<W>,
}

impl<W: Write> WriterSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write> DiagnosticSink for WriterSink<W> {
    fn emit(&self, event: &Diagnostic<'_>) -> io::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| io::Error::other("diagnostic writer lock poisoned"))?;
        writeln!(writer, "{event}")?;
        writer.flush()
    }
}

/// Deliver an event, discarding any sink failure.
pub(crate) fn emit(sink: &dyn DiagnosticSink, event: &Diagnostic<'_>) {
    if let Err(e) = sink.emit(event) {
        log::debug!("diagnostic sink failed: {e}");
    }
}
