//! Deal source backed by a terminal history export.
//!
//! The export is a JSON document holding the account's deals and orders with
//! the terminal's own field names:
//!
//! ```json
//! {
//!   "deals": [
//!     {"ticket": 1001, "order": 501, "time": 1705311000, "type": 0, "entry": 0,
//!      "symbol": "USDJPY", "price": 147.25, "volume": 0.5,
//!      "profit": 0.0, "commission": -2.5, "fee": 0.0, "swap": 0.0}
//!   ],
//!   "orders": [{"ticket": 501, "sl": 146.75}]
//! }
//! ```
//!
//! `time` is epoch seconds on the terminal clock.

use chrono::DateTime;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;
use tradenote_core::{
    Deal, DealSource, DealTicket, Order, OrderRef, SourceError, SymbolFilter, TimeWindow,
};

#[derive(Debug, Deserialize)]
struct RawDeal {
    ticket: u64,
    order: u64,
    time: i64,
    #[serde(rename = "type")]
    deal_type: i64,
    entry: i64,
    symbol: String,
    price: f64,
    volume: f64,
    #[serde(default)]
    profit: f64,
    #[serde(default)]
    commission: f64,
    #[serde(default)]
    fee: f64,
    #[serde(default)]
    swap: f64,
}

impl RawDeal {
    fn into_deal(self) -> Result<Deal, SourceError> {
        let timestamp = DateTime::from_timestamp(self.time, 0)
            .ok_or_else(|| {
                let reason = format!("deal {}: time {} out of range", self.ticket, self.time);
                SourceError::Malformed(reason)
            })?
            .naive_utc();
        Ok(Deal {
            ticket: DealTicket(self.ticket),
            timestamp,
            symbol: self.symbol,
            deal_type: self.deal_type.into(),
            entry: self.entry.into(),
            price: self.price,
            volume: self.volume,
            profit: self.profit,
            commission: self.commission,
            fee: self.fee,
            swap: self.swap,
            order: OrderRef(self.order),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawOrder {
    ticket: u64,
    #[serde(default)]
    sl: f64,
}

#[derive(Debug, Deserialize)]
struct RawHistory {
    #[serde(default)]
    deals: Vec<RawDeal>,
    #[serde(default)]
    orders: Vec<RawOrder>,
}

/// In-memory deal and order history loaded from an export file.
#[derive(Debug, Clone)]
pub struct HistoryFile {
    name: String,
    deals: Vec<Deal>,
    orders: HashMap<OrderRef, Order>,
}

impl HistoryFile {
    /// Read and parse a history export.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                SourceError::Unavailable(format!("history file {} not found", path.display()))
            }
            _ => SourceError::Io(e),
        })?;
        Self::from_json(&path.display().to_string(), &content)
    }

    /// Parse a history export held in memory.
    pub fn from_json(name: &str, json: &str) -> Result<Self, SourceError> {
        let raw: RawHistory =
            serde_json::from_str(json).map_err(|e| SourceError::Malformed(e.to_string()))?;
        let deals = raw
            .deals
            .into_iter()
            .map(RawDeal::into_deal)
            .collect::<Result<Vec<_>, _>>()?;
        let orders = raw
            .orders
            .into_iter()
            .map(|o| Order::new(OrderRef(o.ticket), o.sl));
        let history = Self::from_parts(name, deals, orders);
        debug!(
            source = %history.name,
            deals = history.deals.len(),
            orders = history.orders.len(),
            "loaded history export"
        );
        Ok(history)
    }

    pub fn from_parts(
        name: &str,
        deals: Vec<Deal>,
        orders: impl IntoIterator<Item = Order>,
    ) -> Self {
        Self {
            name: name.to_string(),
            deals,
            orders: orders.into_iter().map(|o| (o.ticket, o)).collect(),
        }
    }

    pub fn deal_count(&self) -> usize {
        self.deals.len()
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}

impl DealSource for HistoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_deals(
        &self,
        window: &TimeWindow,
        filter: &SymbolFilter,
    ) -> Result<Vec<Deal>, SourceError> {
        let mut deals: Vec<Deal> = self
            .deals
            .iter()
            .filter(|d| window.contains(d.timestamp) && filter.matches(&d.symbol))
            .cloned()
            .collect();
        deals.sort_by_key(|d| (d.timestamp, d.ticket));
        Ok(deals)
    }

    fn lookup_order(&self, reference: OrderRef) -> Result<Order, SourceError> {
        self.orders
            .get(&reference)
            .copied()
            .ok_or(SourceError::OrderNotFound { reference })
    }
}
