//! Custom actions for the Discount actor.

use crate::model::{DiscountId, OrderId};
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub enum DiscountAction {
    /// Count one use for `order_id` and price it against `subtotal`. Redeeming
    /// again for the same order counts nothing.
    Redeem { order_id: OrderId, subtotal: Decimal },
    /// Give back the use held by `order_id`, if any.
    Release { order_id: OrderId },
}

/// Results from DiscountActions - variants match 1:1 with DiscountAction
#[derive(Debug, Clone)]
pub enum DiscountActionResult {
    Redeem(Redemption),
    Release(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Redemption {
    pub discount_id: DiscountId,
    pub code: String,
    pub amount_off: Decimal,
    pub replayed: bool,
}
