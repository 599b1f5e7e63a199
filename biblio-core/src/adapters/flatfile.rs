//! Flat-file record store - one encoded record per line

use std::fs;
use std::io::{BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::codec::Record;
use crate::domain::result::{DecodeError, Result};
use crate::ports::{LoadReport, RecordStore};

/// Text file holding one collection of records
///
/// Saves go through a temp file in the same directory that is renamed over
/// the target, so readers never see a half-written file.
#[derive(Debug)]
pub struct FlatFileStore<R> {
    path: PathBuf,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> FlatFileStore<R> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode file contents, skipping blank lines and reporting bad ones
    ///
    /// Lines are decoded one at a time so a single line of bad bytes cannot
    /// take the rest of the file down with it.
    fn parse(&self, contents: &[u8]) -> LoadReport<R> {
        let mut report = LoadReport::default();

        for (idx, raw) in contents.split(|b| *b == b'\n').enumerate() {
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            let decoded = std::str::from_utf8(raw)
                .map_err(|e| DecodeError::Encoding(e.valid_up_to()))
                .and_then(|line| {
                    if line.trim().is_empty() {
                        Ok(None)
                    } else {
                        R::decode(line).map(Some)
                    }
                });
            match decoded {
                Ok(None) => {}
                Ok(Some(record)) => report.records.push(record),
                Err(e) => {
                    let msg = format!(
                        "Skipped invalid {} record at {}:{}: {}",
                        R::KIND,
                        self.path.display(),
                        idx + 1,
                        e
                    );
                    warn!("{}", msg);
                    report.warnings.push(msg);
                }
            }
        }

        report
    }

    fn write_atomically(&self, records: &[R]) -> std::io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let tmp = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            for record in records {
                writeln!(writer, "{}", record.encode())?;
            }
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl<R: Record> RecordStore<R> for FlatFileStore<R> {
    fn load(&self) -> LoadReport<R> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let msg = format!(
                    "No {} file at {}, starting with an empty collection",
                    R::KIND,
                    self.path.display()
                );
                debug!("{}", msg);
                return LoadReport::empty_with_warning(msg);
            }
            Err(e) => {
                let msg = format!(
                    "Could not read {} file {}: {}",
                    R::KIND,
                    self.path.display(),
                    e
                );
                warn!("{}", msg);
                return LoadReport::empty_with_warning(msg);
            }
        };

        let report = self.parse(&contents);
        debug!(
            "Loaded {} {} record(s) from {}",
            report.records.len(),
            R::KIND,
            self.path.display()
        );
        report
    }

    fn save(&self, records: &[R]) -> Result<()> {
        self.write_atomically(records)?;
        debug!(
            "Saved {} {} record(s) to {}",
            records.len(),
            R::KIND,
            self.path.display()
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
