//! Per-tick numeric log of the ego car relative to the priority vehicle
//!
//! Each line is `,<lateral offset>,<ego speed>,<ego acceleration>`. The leading
//! empty column is where the longitudinal distance used to be written and is
//! kept so existing analysis scripts keep parsing the file.

use anyhow::{Context, Result};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Fields logged for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogRecord {
    /// `priority.x - ego.x`
    pub lateral_offset: f64,
    pub ego_velocity_x: f64,
    pub ego_acceleration: f64,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            ",{},{},{}",
            self.lateral_offset, self.ego_velocity_x, self.ego_acceleration
        )
    }
}

/// Append-only writer for log records
pub struct TelemetryWriter {
    path: PathBuf,
    out: BufWriter<File>,
    records_written: u64,
}

impl TelemetryWriter {
    /// Open `path` for appending, creating it if needed
    pub fn append_to(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open telemetry log {}", path.display()))?;

        Ok(Self {
            path,
            out: BufWriter::new(file),
            records_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn write(&mut self, record: &LogRecord) -> Result<()> {
        writeln!(self.out, "{record}")
            .with_context(|| format!("Failed to write telemetry to {}", self.path.display()))?;
        self.records_written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out
            .flush()
            .with_context(|| format!("Failed to flush telemetry to {}", self.path.display()))
    }
}

impl Drop for TelemetryWriter {
    fn drop(&mut self) {
        if let Err(err) = self.out.flush() {
            log::warn!("Dropping telemetry for {}: {}", self.path.display(), err);
        }
    }
}
