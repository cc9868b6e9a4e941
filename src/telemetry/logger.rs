//! # Reading Logger
//!
//! JSONL recorder for decoded readings.
//!
//! Each line looks like:
//!
//! ```text
//! {"timestamp":"2024-05-01T12:00:00.123+00:00","sequence":42,"channels":[16,32,48,64]}
//! ```
//!
//! Files are named `readings_<YYYYmmdd_HHMMSS>_<n>.jsonl` so that a plain
//! name sort is also chronological.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::TelemetryConfig;
use crate::error::Result;
use crate::fmspic::decoder::Reading;
use crate::sink::ReadingSink;

const FILE_PREFIX: &str = "readings_";
const FILE_SUFFIX: &str = ".jsonl";

/// One line of the log.
#[derive(Debug, Serialize)]
struct ReadingRecord<'a> {
    timestamp: DateTime<Utc>,
    sequence: u64,
    channels: &'a [u8],
}

/// Writes readings to rotating JSONL files.
#[derive(Debug)]
pub struct ReadingLogger {
    log_dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    records_in_file: usize,
    files_opened: u64,
    sequence: u64,
    write_errors: u64,
}

impl ReadingLogger {
    /// Creates the log directory if needed.
    ///
    /// No file is opened until the first reading arrives.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the directory cannot be created.
    pub fn new(config: &TelemetryConfig) -> Result<Self> {
        let log_dir = PathBuf::from(&config.log_dir);
        fs::create_dir_all(&log_dir)?;

        Ok(Self {
            log_dir,
            max_records_per_file: config.max_records_per_file.max(1),
            max_files_to_keep: config.max_files_to_keep.max(1),
            writer: None,
            records_in_file: 0,
            files_opened: 0,
            sequence: 0,
            write_errors: 0,
        })
    }

    /// Readings recorded so far.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Readings lost to I/O errors.
    pub fn write_errors(&self) -> u64 {
        self.write_errors
    }

    /// Append one reading, rotating files as needed.
    pub fn record(&mut self, reading: &Reading) -> Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        self.sequence += 1;
        let record = ReadingRecord {
            timestamp: Utc::now(),
            sequence: self.sequence,
            channels: reading.channels(),
        };
        let line = serde_json::to_string(&record)
            .map_err(std::io::Error::from)?;

        if let Some(writer) = self.writer.as_mut() {
            writeln!(writer, "{}", line)?;
        }
        self.records_in_file += 1;
        Ok(())
    }

    /// Flush buffered lines to disk.
    pub fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    fn rotate(&mut self) -> Result<()> {
        self.flush()?;
        self.writer = None;

        self.files_opened += 1;
        let name = format!(
            "{}{}_{:06}{}",
            FILE_PREFIX,
            Utc::now().format("%Y%m%d_%H%M%S"),
            self.files_opened,
            FILE_SUFFIX
        );
        let path = self.log_dir.join(name);
        debug!("Opening telemetry file {}", path.display());

        self.writer = Some(BufWriter::new(File::create(&path)?));
        self.records_in_file = 0;
        self.prune()
    }

    fn prune(&self) -> Result<()> {
        let mut files = log_files(&self.log_dir)?;
        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        files.sort();
        let excess = files.len() - self.max_files_to_keep;
        for old in files.into_iter().take(excess) {
            debug!("Removing old telemetry file {}", old.display());
            fs::remove_file(&old)?;
        }
        Ok(())
    }
}

fn log_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(FILE_PREFIX) && n.ends_with(FILE_SUFFIX));
        if is_log {
            files.push(path);
        }
    }
    Ok(files)
}

impl ReadingSink for ReadingLogger {
    fn on_reading(&mut self, reading: &Reading) {
        if let Err(e) = self.record(reading) {
            self.write_errors += 1;
            if self.write_errors == 1 || self.write_errors % 1000 == 0 {
                warn!("Failed to record reading ({} total): {}", self.write_errors, e);
            }
        }
    }
}

impl Drop for ReadingLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!("Failed to flush telemetry log: {}", e);
        }
    }
}
