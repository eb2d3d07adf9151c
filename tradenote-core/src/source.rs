//! Deal source trait and structured error types.
//!
//! The DealSource trait abstracts over where deal history comes from (a
//! terminal export file, a live terminal bridge, a test fixture) so the
//! export session never depends on a particular provider.

use crate::calendar::TimeWindow;
use crate::domain::{Deal, Order, OrderRef};
use crate::symbol::SymbolFilter;
use thiserror::Error;

/// Errors raised while reading deal or order history.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("history unavailable: {0}")]
    Unavailable(String),

    #[error("order {reference} not found in history")]
    OrderNotFound { reference: OrderRef },

    #[error("malformed history: {0}")]
    Malformed(String),

    #[error("history I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Provider of deal and order history.
pub trait DealSource {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Deals executed inside `window` (terminal clock) whose symbol passes
    /// `filter`, ordered by execution time.
    fn fetch_deals(&self, window: &TimeWindow, filter: &SymbolFilter)
        -> Result<Vec<Deal>, SourceError>;

    /// Order a deal was executed for.
    fn lookup_order(&self, reference: OrderRef) -> Result<Order, SourceError>;
}
