//! Observer seam for run diagnostics and side-channel output.
//!
//! Stats files and JSON dumps are not part of the algorithm: they are
//! observers the orchestrator invokes with phase timings while a run
//! progresses and with the finished result once it completes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use chrono::Utc;

use crate::engine::CategorizationResult;
use crate::error::Result;

/// A completed processing phase.
#[derive(Debug, Clone, Copy)]
pub struct PhaseEvent<'a> {
    /// Domain being processed, when the phase is domain-scoped.
    pub domain: Option<&'a str>,
    /// Human-readable phase label.
    pub phase: &'a str,
    pub elapsed: Duration,
}

/// Receives phase timings while a run progresses and the finished result
/// once it completes. Observers run after the result is computed or between
/// phases; they never alter it.
pub trait RunObserver {
    fn phase_completed(&mut self, _event: &PhaseEvent<'_>) -> Result<()> {
        Ok(())
    }

    fn run_completed(&mut self, _result: &CategorizationResult) -> Result<()> {
        Ok(())
    }
}

/// Writes elapsed-time lines for each phase to a stats file.
pub struct StatsFileObserver {
    writer: BufWriter<File>,
}

impl StatsFileObserver {
    /// Creates (or truncates) the stats file and stamps a header line.
    pub fn create(path: &Path) -> Result<Self> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "Categorization run started at {}.", Utc::now().to_rfc3339())?;
        Ok(StatsFileObserver { writer })
    }
}

impl RunObserver for StatsFileObserver {
    fn phase_completed(&mut self, event: &PhaseEvent<'_>) -> Result<()> {
        match event.domain {
            Some(domain) => writeln!(
                self.writer,
                "[{}] {} in {:.6} secs.",
                domain,
                event.phase,
                event.elapsed.as_secs_f64()
            )?,
            None => writeln!(
                self.writer,
                "{} in {:.6} secs.",
                event.phase,
                event.elapsed.as_secs_f64()
            )?,
        }
        Ok(())
    }

    fn run_completed(&mut self, result: &CategorizationResult) -> Result<()> {
        writeln!(self.writer, "Completed {} domains.", result.len())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes the finished result as a pretty-printed JSON document.
pub struct JsonDumpObserver {
    path: std::path::PathBuf,
}

impl JsonDumpObserver {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        JsonDumpObserver { path: path.into() }
    }
}

impl RunObserver for JsonDumpObserver {
    fn run_completed(&mut self, result: &CategorizationResult) -> Result<()> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, result)?;
        writer.flush()?;
        Ok(())
    }
}
