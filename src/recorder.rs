use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::{debug, warn};
use thiserror::Error;

use crate::exchange_rate::{DateFormat, ExchangeRateSample};

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("can't create directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("can't open {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("can't lock {}: {source}", .path.display())]
    Lock { path: PathBuf, source: io::Error },
    #[error("can't write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("can't encode row: {0}")]
    Encode(#[from] csv::Error),
}

/// Append-only CSV ledger of `Date,<BASE>_<TARGET>` rows.
#[derive(Debug, Clone)]
pub struct CsvRecorder {
    path: PathBuf,
    date_format: DateFormat,
}

impl CsvRecorder {
    pub fn new(path: impl Into<PathBuf>, date_format: DateFormat) -> Self {
        Self {
            path: path.into(),
            date_format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one row for `sample`, preceded by the header when the ledger is empty.
    ///
    /// The header check and the write happen while holding an exclusive lock on
    /// the file, so concurrent writers never duplicate the header. Header and
    /// row go out in a single write; on failure the file is cut back to its
    /// previous length. Returns whether the header was written.
    pub fn append(&self, sample: &ExchangeRateSample) -> Result<bool, RecordError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| RecordError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.open_error(source))?;
        // Released when `file` is dropped.
        file.lock().map_err(|source| RecordError::Lock {
            path: self.path.clone(),
            source,
        })?;

        let len = file
            .metadata()
            .map_err(|source| self.open_error(source))?
            .len();
        let with_header = len == 0;
        let bytes = encode(sample, with_header, self.date_format)?;

        write_or_rollback(&mut file, &self.path, &bytes, len)?;
        debug!(
            "Appended {} bytes to {} (header: {})",
            bytes.len(),
            self.path.display(),
            with_header
        );

        Ok(with_header)
    }

    fn open_error(&self, source: io::Error) -> RecordError {
        RecordError::Open {
            path: self.path.clone(),
            source,
        }
    }
}

/// Something the ledger can be written to and cut back on failure.
trait LedgerFile: Write {
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
    fn sync(&mut self) -> io::Result<()>;
}

impl LedgerFile for File {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }
}

/// Writes `bytes` in one go; on failure the ledger is cut back to `len`.
fn write_or_rollback(
    out: &mut impl LedgerFile,
    path: &Path,
    bytes: &[u8],
    len: u64,
) -> Result<(), RecordError> {
    if let Err(source) = out.write_all(bytes).and_then(|()| out.sync()) {
        if let Err(err) = out.truncate_to(len) {
            warn!("Can't roll back {}: {}", path.display(), err);
        }
        return Err(RecordError::Write {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}

fn encode(
    sample: &ExchangeRateSample,
    with_header: bool,
    date_format: DateFormat,
) -> Result<Vec<u8>, RecordError> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(line_terminator())
        .from_writer(Vec::new());

    if with_header {
        let pair = sample.pair_label();
        wtr.write_record(["Date", pair.as_str()])?;
    }
    wtr.write_record([date_format.render(sample.observed_at), sample.rate.to_string()])?;

    wtr.into_inner()
        .map_err(|err| RecordError::Encode(err.into_error().into()))
}

fn line_terminator() -> csv::Terminator {
    if cfg!(windows) {
        csv::Terminator::CRLF
    } else {
        csv::Terminator::Any(b'\n')
    }
}
