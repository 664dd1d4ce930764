//! Custom actions for the Order actor.

use crate::model::Order;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Record a captured payment and sell the seats. Replaying it on a paid
    /// order returns the order unchanged.
    ConfirmPayment {
        payment_ref: String,
        now: DateTime<Utc>,
    },
    /// Cancel and give back seats and discount use. Cancelling twice is a
    /// no-op.
    Cancel { now: DateTime<Utc> },
    /// Admit every seat of the order at once.
    CheckIn { now: DateTime<Utc> },
    /// Admit the single seat behind `token`.
    CheckInToken { token: String, now: DateTime<Utc> },
}

/// Results from OrderActions - variants match 1:1 with OrderAction
#[derive(Debug, Clone)]
pub enum OrderActionResult {
    ConfirmPayment(Confirmation),
    Cancel(Order),
    CheckIn(Order),
    CheckInToken(Order),
}

#[derive(Debug, Clone)]
pub struct Confirmation {
    pub order: Order,
    /// The order was already paid; nothing was settled.
    pub replayed: bool,
}
