//! TradeSummary: one consolidated ledger row per logical trade.

use super::deal::DealType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade direction, taken from the first deal of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
    Balance,
    Other,
}

impl Direction {
    /// Label written to the ledger.
    pub fn label(self) -> &'static str {
        match self {
            Direction::Buy => "buy",
            Direction::Sell => "sell",
            Direction::Balance => "balance",
            Direction::Other => "else",
        }
    }
}

impl From<DealType> for Direction {
    fn from(deal_type: DealType) -> Self {
        match deal_type {
            DealType::Buy => Direction::Buy,
            DealType::Sell => Direction::Sell,
            DealType::Balance => Direction::Balance,
            DealType::Other(_) => Direction::Other,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Column titles of the ledger table, in write order.
pub const LEDGER_COLUMNS: [&str; 13] = [
    "date",
    "day_of_week",
    "symbol",
    "direction",
    "entry_price",
    "stop_loss_price",
    "close_price",
    "entry_volume",
    "gross_profit",
    "commission_total",
    "swap_total",
    "net_profit",
    "risk_reward",
];

/// A single ledger cell.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerValue {
    Text(String),
    Number(f64),
}

impl fmt::Display for LedgerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerValue::Text(text) => f.write_str(text),
            LedgerValue::Number(value) => write!(f, "{value}"),
        }
    }
}

/// Aggregated result of one export run.
///
/// Prices are volume-weighted and already rounded by magnitude. Monetary
/// totals are raw sums; `net_profit` is exactly
/// `gross_profit + commission_total + swap_total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSummary {
    // ── Identification ──
    pub date: NaiveDate,
    pub day_of_week: String,
    pub symbol: String,
    pub direction: Direction,

    // ── Prices ──
    pub entry_price: f64,
    pub stop_loss_price: f64,
    pub close_price: f64,

    // ── Size ──
    pub entry_volume: f64,

    // ── PnL ──
    pub gross_profit: f64,
    pub commission_total: f64,
    pub swap_total: f64,
    pub net_profit: f64,

    pub risk_reward: f64,
}

impl TradeSummary {
    /// The 13 ledger cells, ordered as `LEDGER_COLUMNS`.
    pub fn ledger_row(&self) -> [LedgerValue; 13] {
        [
            LedgerValue::Text(self.date.format("%Y/%m/%d").to_string()),
            LedgerValue::Text(self.day_of_week.clone()),
            LedgerValue::Text(self.symbol.clone()),
            LedgerValue::Text(self.direction.label().to_string()),
            LedgerValue::Number(self.entry_price),
            LedgerValue::Number(self.stop_loss_price),
            LedgerValue::Number(self.close_price),
            LedgerValue::Number(self.entry_volume),
            LedgerValue::Number(self.gross_profit),
            LedgerValue::Number(self.commission_total),
            LedgerValue::Number(self.swap_total),
            LedgerValue::Number(self.net_profit),
            LedgerValue::Number(self.risk_reward),
        ]
    }
}
