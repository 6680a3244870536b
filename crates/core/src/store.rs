//! Append-only screening log.
//!
//! Each disease owns one [`RecordStore`], a newline-delimited JSON file holding one
//! [`Record`] per line in write order.
//!
//! ## Write path
//! A record is serialized to a complete line before the file is touched, then written with a
//! single `write_all` + `flush` while holding the store's write lock. The lock serializes
//! appends from concurrent requests, so lines never interleave. If the existing file does not
//! end with a newline (for example a truncated previous write) a newline is written first so
//! the earlier content cannot swallow the new record.
//!
//! ## Read path
//! [`RecordStore::load_all`] never fails. Blank lines are ignored, malformed lines are skipped
//! with a warning, and a missing or unreadable log yields whatever could be read (possibly
//! nothing).

use crate::constants::{LEGACY_INPUT_PREFIX, LEGACY_PREDICTION_SEPARATOR};
use crate::error::{ScreeningError, ScreeningResult};
use crate::record::Record;
use screening_types::DiseaseKey;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

#[derive(Debug)]
pub struct RecordStore {
    disease: DiseaseKey,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl RecordStore {
    pub fn new(disease: DiseaseKey, path: PathBuf) -> Self {
        Self {
            disease,
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `record` as one line, creating the log and its parent directories if needed.
    ///
    /// # Errors
    ///
    /// - [`ScreeningError::Serialization`] if the record cannot be encoded (nothing is written)
    /// - [`ScreeningError::StorageDirCreation`] if the parent directory cannot be created
    /// - [`ScreeningError::StorageWrite`] if opening or writing the log fails
    pub fn append(&self, record: &Record) -> ScreeningResult<()> {
        let mut line = serde_json::to_string(record).map_err(ScreeningError::Serialization)?;
        line.push('\n');

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(ScreeningError::StorageDirCreation)?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(ScreeningError::StorageWrite)?;

        if !ends_with_newline(&mut file).map_err(ScreeningError::StorageWrite)? {
            line.insert(0, '\n');
        }

        file.write_all(line.as_bytes())
            .map_err(ScreeningError::StorageWrite)?;
        file.flush().map_err(ScreeningError::StorageWrite)?;

        tracing::debug!(disease = %self.disease, id = %record.id, "appended screening record");
        Ok(())
    }

    /// Reads every parseable record, oldest first.
    ///
    /// A line whose `id` is not a lowercase hyphenated UUID is skipped as malformed, since it
    /// could never be addressed by a result-view query.
    pub fn load_all(&self) -> Vec<Record> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(
                    disease = %self.disease,
                    "failed to open screening log {}: {}",
                    self.path.display(),
                    e
                );
                return Vec::new();
            }
        };

        let mut records = Vec::new();
        for (index, raw) in BufReader::new(file).split(b'\n').enumerate() {
            let line_no = index + 1;
            let raw = match raw {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(
                        disease = %self.disease,
                        "stopped reading {} at line {}: {}",
                        self.path.display(),
                        line_no,
                        e
                    );
                    break;
                }
            };

            let line = match std::str::from_utf8(&raw) {
                Ok(line) => line.trim(),
                Err(_) => {
                    tracing::warn!(disease = %self.disease, line = line_no, "skipping non UTF-8 line");
                    continue;
                }
            };

            if line.is_empty() {
                continue;
            }

            if is_legacy_line(line) {
                tracing::warn!(
                    disease = %self.disease,
                    line = line_no,
                    "skipping line in retired 'Input: …, Prediction: …' format"
                );
                continue;
            }

            match serde_json::from_str::<Record>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(
                        disease = %self.disease,
                        line = line_no,
                        "skipping malformed screening record: {}",
                        e
                    );
                }
            }
        }

        records
    }
}

fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Lines produced by the old free-text writer: `Input: {...}, Prediction: <message>`.
fn is_legacy_line(line: &str) -> bool {
    line.starts_with(LEGACY_INPUT_PREFIX) && line.contains(LEGACY_PREDICTION_SEPARATOR)
}
