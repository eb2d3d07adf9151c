//! Domain types for Tradenote

pub mod deal;
pub mod ids;
pub mod order;
pub mod summary;

pub use deal::{Deal, DealEntry, DealType};
pub use ids::{DealTicket, OrderRef};
pub use order::Order;
pub use summary::{Direction, LedgerValue, TradeSummary, LEDGER_COLUMNS};
