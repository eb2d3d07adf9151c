//! Ledger sinks: where finished trade summaries are persisted.
//!
//! The CSV ledger treats one file as the ledger table. The first line must be
//! the 13-column header; each export appends one data row below the last one.
//! Writes go to `{file}.tmp` and are renamed into place, so an interrupted run
//! never leaves a half-written ledger behind.

use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;
use tradenote_core::{TradeSummary, LEDGER_COLUMNS};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger {path} does not exist")]
    NotFound { path: PathBuf },

    #[error("ledger {path} has an unexpected header: {found:?}")]
    HeaderMismatch { path: PathBuf, found: Vec<String> },

    #[error("ledger CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("ledger I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Where a summary landed in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerPosition {
    /// 1-based data row number (the header is not counted).
    pub row: usize,
}

/// Persists trade summaries.
pub trait LedgerSink {
    /// Human-readable location of the ledger.
    fn describe(&self) -> String;

    /// Append one summary as the next row.
    fn append(&mut self, summary: &TradeSummary) -> Result<LedgerPosition, LedgerError>;
}

/// A ledger stored as a CSV file.
#[derive(Debug, Clone)]
pub struct CsvLedger {
    path: PathBuf,
    create_if_missing: bool,
}

impl CsvLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            create_if_missing: false,
        }
    }

    /// Start a fresh ledger with only the header row when the file is missing.
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Data rows currently in the ledger, as text cells.
    pub fn rows(&self) -> Result<Vec<Vec<String>>, LedgerError> {
        let bytes = match self.read_existing()? {
            Some(bytes) => bytes,
            None => return Err(LedgerError::NotFound { path: self.path.clone() }),
        };
        let mut reader = self.checked_reader(&bytes)?;
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }

    fn read_existing(&self) -> Result<Option<Vec<u8>>, LedgerError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// CSV reader over `bytes` whose header has been validated.
    fn checked_reader<'a>(&self, bytes: &'a [u8]) -> Result<csv::Reader<&'a [u8]>, LedgerError> {
        let mut reader = csv::Reader::from_reader(bytes);
        let header = reader.headers()?.clone();
        let matches = header.len() == LEDGER_COLUMNS.len()
            && header
                .iter()
                .map(|cell| cell.trim_start_matches('\u{feff}').trim())
                .eq(LEDGER_COLUMNS.iter().copied());
        if !matches {
            return Err(LedgerError::HeaderMismatch {
                path: self.path.clone(),
                found: header.iter().map(str::to_string).collect(),
            });
        }
        Ok(reader)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LedgerSink for CsvLedger {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn append(&mut self, summary: &TradeSummary) -> Result<LedgerPosition, LedgerError> {
        let existing = self.read_existing()?.filter(|bytes| !bytes.is_empty());

        let (mut content, existing_rows, needs_header) = match existing {
            Some(bytes) => {
                let mut count = 0;
                for record in self.checked_reader(&bytes)?.records() {
                    record?;
                    count += 1;
                }
                (bytes, count, false)
            }
            None if self.path.exists() || self.create_if_missing => (Vec::new(), 0, true),
            None => return Err(LedgerError::NotFound { path: self.path.clone() }),
        };

        if content.last().is_some_and(|&b| b != b'\n') {
            content.push(b'\n');
        }

        let mut writer = csv::Writer::from_writer(content);
        if needs_header {
            writer.write_record(LEDGER_COLUMNS)?;
        }
        let row: Vec<String> = summary.ledger_row().iter().map(|cell| cell.to_string()).collect();
        writer.write_record(&row)?;
        let content = writer.into_inner().map_err(|e| e.into_error())?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.tmp_path();
        fs::write(&tmp, &content)?;
        fs::rename(&tmp, &self.path)?;

        let position = LedgerPosition { row: existing_rows + 1 };
        info!(
            ledger = %self.path.display(),
            row = position.row,
            symbol = %summary.symbol,
            "appended trade row"
        );
        Ok(position)
    }
}
