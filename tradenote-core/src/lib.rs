//! Tradenote Core: domain types and the trade aggregation pass.
//!
//! This crate holds everything that does not touch the filesystem:
//! - Domain types (deals, orders, trade summaries, ledger rows)
//! - The trade aggregator: a flat deal sequence reduced to one summary
//! - Magnitude-aware price rounding
//! - Calendar helpers (user date parsing, terminal clock shift, weekday labels)
//! - Terminal-style symbol group filters
//! - The `DealSource` trait that history providers implement

pub mod aggregate;
pub mod calendar;
pub mod domain;
pub mod price;
pub mod source;
pub mod symbol;

pub use aggregate::{aggregate, aggregate_localized, AggregationError, VOLUME_EPSILON};
pub use calendar::{
    parse_user_datetime, Localization, TerminalClock, TimeWindow, WeekdayLocale, WindowError,
};
pub use domain::{
    Deal, DealEntry, DealTicket, DealType, Direction, LedgerValue, Order, OrderRef, TradeSummary,
    LEDGER_COLUMNS,
};
pub use price::{round_by_magnitude, round_to};
pub use source::{DealSource, SourceError};
pub use symbol::{SymbolFilter, SymbolFilterError};
