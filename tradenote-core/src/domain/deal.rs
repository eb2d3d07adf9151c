//! Deal: a single fill or balance operation from the terminal history.

use super::ids::{DealTicket, OrderRef};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Deal type as recorded by the terminal.
///
/// Serialized as the terminal's integer code (0 buy, 1 sell, 2 balance).
/// Codes outside that set are kept verbatim in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum DealType {
    Buy,
    Sell,
    Balance,
    Other(i64),
}

impl DealType {
    pub fn code(self) -> i64 {
        match self {
            DealType::Buy => 0,
            DealType::Sell => 1,
            DealType::Balance => 2,
            DealType::Other(code) => code,
        }
    }

    /// The side that closes a position opened on this side.
    ///
    /// Only buy and sell have an opposite; balance operations and other
    /// codes never close anything.
    pub fn opposite(self) -> Option<DealType> {
        match self {
            DealType::Buy => Some(DealType::Sell),
            DealType::Sell => Some(DealType::Buy),
            DealType::Balance | DealType::Other(_) => None,
        }
    }
}

impl From<i64> for DealType {
    fn from(code: i64) -> Self {
        match code {
            0 => DealType::Buy,
            1 => DealType::Sell,
            2 => DealType::Balance,
            other => DealType::Other(other),
        }
    }
}

impl From<DealType> for i64 {
    fn from(deal_type: DealType) -> Self {
        deal_type.code()
    }
}

/// Whether a deal opened or closed position volume.
///
/// Serialized as the terminal's integer code (0 in, 1 out). Reversals and
/// close-by deals land in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum DealEntry {
    In,
    Out,
    Other(i64),
}

impl From<i64> for DealEntry {
    fn from(code: i64) -> Self {
        match code {
            0 => DealEntry::In,
            1 => DealEntry::Out,
            other => DealEntry::Other(other),
        }
    }
}

impl From<DealEntry> for i64 {
    fn from(entry: DealEntry) -> Self {
        match entry {
            DealEntry::In => 0,
            DealEntry::Out => 1,
            DealEntry::Other(code) => code,
        }
    }
}

/// One row of deal history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub ticket: DealTicket,
    /// Execution time on the terminal clock.
    pub timestamp: NaiveDateTime,
    pub symbol: String,
    #[serde(rename = "type")]
    pub deal_type: DealType,
    pub entry: DealEntry,
    pub price: f64,
    pub volume: f64,
    pub profit: f64,
    pub commission: f64,
    pub fee: f64,
    pub swap: f64,
    pub order: OrderRef,
}

impl Deal {
    pub fn is_entry(&self) -> bool {
        self.entry == DealEntry::In
    }

    pub fn is_exit(&self) -> bool {
        self.entry == DealEntry::Out
    }

    /// Commission and fee together, as booked against the trade.
    pub fn costs(&self) -> f64 {
        self.commission + self.fee
    }
}
