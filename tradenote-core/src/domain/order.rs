use super::ids::OrderRef;
use serde::{Deserialize, Serialize};

/// Historical order, looked up for the stop loss it was placed with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub ticket: OrderRef,
    /// Stop loss price; 0.0 when the order had none.
    pub stop_loss_price: f64,
}

impl Order {
    pub fn new(ticket: OrderRef, stop_loss_price: f64) -> Self {
        Self { ticket, stop_loss_price }
    }

    pub fn has_stop_loss(&self) -> bool {
        self.stop_loss_price != 0.0
    }
}
