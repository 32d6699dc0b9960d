//! Append-only JSONL invocation log.
//!
//! One line per finished call:
//!
//! ```json
//! {"type":"invocation","timestamp":"2026-01-01T00:00:00.000Z","invocation_id":"inv-1",
//!  "capability":"echo","phase":"succeeded","succeeded":true,"elapsed_ms":0.4}
//! ```

use capdispatch_application::{InvocationEvent, InvocationLogger};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A log line: the event plus its record type and write time.
#[derive(Serialize)]
struct InvocationRecord<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    timestamp: String,
    #[serde(flatten)]
    event: &'a InvocationEvent,
}

/// Writes [`InvocationEvent`]s to a file, one JSON object per line.
pub struct JsonlInvocationLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlInvocationLogger {
    /// Open `path` for appending, creating it and its parent directories.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_record(&self, record: &InvocationRecord<'_>) -> io::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| io::Error::other("invocation log writer poisoned"))?;
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

impl InvocationLogger for JsonlInvocationLogger {
    fn log(&self, event: &InvocationEvent) {
        let record = InvocationRecord {
            record_type: "invocation",
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event,
        };

        if let Err(e) = self.write_record(&record) {
            tracing::debug!(
                path = %self.path.display(),
                invocation = %event.invocation_id,
                error = %e,
                "dropped invocation log record"
            );
        }
    }
}
