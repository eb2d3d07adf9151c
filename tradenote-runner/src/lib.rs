//! Tradenote Runner: the export session around the core aggregator.
//!
//! This crate builds on `tradenote-core` to provide:
//! - TOML configuration with defaults for every setting
//! - `HistoryFile`, a deal source backed by a terminal history export
//! - `LedgerSink` and the CSV ledger it appends trade rows to
//! - `export_trade`: fetch -> aggregate -> append, with typed failures

pub mod config;
pub mod history;
pub mod ledger;
pub mod session;

pub use config::{AppConfig, ConfigError, DisplayConfig, LedgerConfig, SourceConfig, TerminalConfig};
pub use history::HistoryFile;
pub use ledger::{CsvLedger, LedgerError, LedgerPosition, LedgerSink};
pub use session::{export_trade, summarize, ExportError, ExportReport, ExportRequest};
