//! Export session: one fetch -> aggregate -> append cycle.
//!
//! The session owns no state between runs. Every failure is returned as an
//! `ExportError` before anything is written, so the caller can report it and
//! decide whether to try again.

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{debug, info, warn};
use tradenote_core::{
    aggregate_localized, AggregationError, DealSource, Localization, SourceError, SymbolFilter,
    SymbolFilterError, TimeWindow, TradeSummary, WindowError,
};

use crate::ledger::{LedgerError, LedgerPosition, LedgerSink};

/// What the user asked to export, in wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
    /// Symbol as typed; matched as `*SYMBOL*`.
    pub symbol: String,
}

#[derive(Debug, Clone)]
pub struct ExportReport {
    pub summary: TradeSummary,
    /// Where the row was written; `None` for a dry run.
    pub position: Option<LedgerPosition>,
    pub deal_count: usize,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid time range: {0}")]
    InvalidWindow(#[from] WindowError),

    #[error("invalid symbol: {0}")]
    InvalidSymbol(#[from] SymbolFilterError),

    #[error("failed to fetch deal history: {0}")]
    Fetch(#[from] SourceError),

    #[error("no deals matched {filter} in the requested range")]
    NoData { filter: String },

    #[error("cannot summarize trade: {0}")]
    Aggregation(#[from] AggregationError),

    #[error("failed to write ledger: {0}")]
    Ledger(#[from] LedgerError),
}

/// Fetch and aggregate without touching any ledger.
pub fn summarize(
    source: &dyn DealSource,
    request: &ExportRequest,
    localization: &Localization,
) -> Result<(TradeSummary, usize), ExportError> {
    let window = TimeWindow::new(request.from, request.to)?.to_terminal(&localization.clock);
    let filter = SymbolFilter::for_symbol(&request.symbol)?;
    debug!(from = %window.from, to = %window.to, filter = %filter, "querying terminal window");

    let deals = source.fetch_deals(&window, &filter)?;
    if deals.is_empty() {
        return Err(ExportError::NoData { filter: filter.to_string() });
    }
    info!(source = source.name(), deals = deals.len(), filter = %filter, "fetched deal history");

    let summary = aggregate_localized(
        &deals,
        |reference| {
            let order = source.lookup_order(reference)?;
            if !order.has_stop_loss() {
                warn!(order = %reference, "entry order has no stop loss");
            }
            Ok::<_, SourceError>(order)
        },
        localization,
    )
    .map_err(|e| {
        warn!(error = %e, "trade rejected");
        e
    })?;

    Ok((summary, deals.len()))
}

/// Run one export: fetch the deals, reduce them to a summary, append it.
pub fn export_trade(
    source: &dyn DealSource,
    ledger: &mut dyn LedgerSink,
    request: &ExportRequest,
    localization: &Localization,
) -> Result<ExportReport, ExportError> {
    let (summary, deal_count) = summarize(source, request, localization)?;
    let position = ledger.append(&summary)?;
    Ok(ExportReport {
        summary,
        position: Some(position),
        deal_count,
    })
}
