//! Command Log
//!
//! Append-only JSONL command logging.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::command::CommandRecord;

/// Errors raised while writing or reading a command log
#[derive(Debug, Error)]
pub enum CommandLogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Writes command records to a JSONL file
pub struct CommandLog {
    writer: Option<BufWriter<File>>,
    record_count: u64,
}

impl CommandLog {
    /// Create a new command log writing to the specified path
    pub fn new(path: impl AsRef<Path>) -> Result<Self, CommandLogError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            record_count: 0,
        })
    }

    /// Create a log that discards records (for testing)
    pub fn null() -> Self {
        Self {
            writer: None,
            record_count: 0,
        }
    }

    /// Number of records seen so far
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Log one record
    pub fn log(&mut self, record: &CommandRecord) -> Result<(), CommandLogError> {
        self.record_count += 1;
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(record).map_err(|source| CommandLogError::Json {
                line: self.record_count as usize,
                source,
            })?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    /// Log multiple records
    pub fn log_batch(&mut self, records: &[CommandRecord]) -> Result<(), CommandLogError> {
        for record in records {
            self.log(record)?;
        }
        Ok(())
    }

    /// Flush the buffer to disk
    pub fn flush(&mut self) -> Result<(), CommandLogError> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for CommandLog {
    fn drop(&mut self) {
        if let Some(ref mut writer) = self.writer {
            // Errors cannot propagate out of drop; callers wanting them flush explicitly.
            let _ = writer.flush();
        }
    }
}

/// Read every record from a JSONL command log, skipping blank lines
pub fn read_command_log(path: impl AsRef<Path>) -> Result<Vec<CommandRecord>, CommandLogError> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = CommandRecord::from_jsonl(&line).map_err(|source| CommandLogError::Json {
            line: idx + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}
