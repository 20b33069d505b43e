//! Status file store
//!
//! The status file holds exactly one record. Commits write a sibling
//! temporary file and rename it over the target, so a reader sees either
//! the previous record or the new one.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use voltwatch_core::record::Significant;
use voltwatch_core::{Record, RecordSink};

/// Single-record file store
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    temp: PathBuf,
}

impl FileStore {
    /// Create a store for `path`
    ///
    /// Nothing is written until the first commit.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "voltwatch".to_owned());
        let temp = path.with_file_name(format!(".{name}.tmp"));
        Self { path, temp }
    }

    /// Status file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_temp(&self, text: &str) -> io::Result<()> {
        let mut file = File::create(&self.temp)?;
        file.write_all(text.as_bytes())?;
        file.sync_all()
    }
}

impl RecordSink for FileStore {
    type Error = io::Error;

    fn commit(&mut self, record: &Record) -> io::Result<()> {
        let text = record
            .render()
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "record does not fit"))?;

        if let Err(e) = self
            .write_temp(&text)
            .and_then(|()| fs::rename(&self.temp, &self.path))
        {
            let _ = fs::remove_file(&self.temp);
            return Err(e);
        }

        info!("Stored \"{}\" in {}", text, self.path.display());
        Ok(())
    }
}

/// Sink that only logs readings
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoSink;

impl RecordSink for EchoSink {
    type Error = io::Error;

    fn commit(&mut self, record: &Record) -> io::Result<()> {
        info!(
            "At local time: {}, lowest battery voltage is: {}",
            record.time,
            Significant(record.voltage)
        );
        Ok(())
    }
}

/// Where the receiver puts records
#[derive(Debug, Clone)]
pub enum Store {
    /// Overwrite the status file
    File(FileStore),
    /// Log only
    Echo(EchoSink),
}

impl Store {
    /// Pick the store for the configured mode
    pub fn new(path: &Path, echo_only: bool) -> Self {
        if echo_only {
            Store::Echo(EchoSink)
        } else {
            Store::File(FileStore::new(path))
        }
    }
}

impl RecordSink for Store {
    type Error = io::Error;

    fn commit(&mut self, record: &Record) -> io::Result<()> {
        let result = match self {
            Store::File(store) => store.commit(record),
            Store::Echo(echo) => echo.commit(record),
        };
        if let Err(e) = &result {
            warn!("Cannot store record \"{}\": {}", record, e);
        }
        result
    }
}
