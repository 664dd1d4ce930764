//! Error types for the Order actor.

use crate::discount_actor::DiscountError;
use crate::event_actor::EventError;
use crate::model::{OrderStatus, TicketTypeId};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("An order needs at least one ticket")]
    EmptyOrder,

    #[error("Quantity for {0} must be at least 1")]
    ZeroQuantity(TicketTypeId),

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Unknown ticket token: {0}")]
    UnknownToken(String),

    #[error("Ticket token already used: {0}")]
    TokenAlreadyUsed(String),

    /// Seats that went through the door cannot be handed back.
    #[error("{admitted} seat(s) already admitted, order cannot be cancelled")]
    SeatsAdmitted { admitted: usize },

    /// Pricing, settlement or release was refused by the event.
    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Discount(#[from] DiscountError),

    #[error("Order service unavailable: {0}")]
    Unavailable(String),
}

impl OrderError {
    /// True when the failure came from an unreachable actor, here or
    /// downstream, rather than from a business rule.
    pub fn is_transient(&self) -> bool {
        match self {
            OrderError::Unavailable(_) => true,
            OrderError::Event(e) => e.is_transient(),
            OrderError::Discount(e) => e.is_transient(),
            _ => false,
        }
    }
}

impl actor_framework::Transient for OrderError {
    fn is_transient(&self) -> bool {
        OrderError::is_transient(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downstream_outages_are_transient() {
        assert!(OrderError::Event(EventError::Unavailable("closed".into())).is_transient());
        assert!(OrderError::Discount(DiscountError::Unavailable("closed".into())).is_transient());
        assert!(!OrderError::Event(EventError::MixedCurrency).is_transient());
        assert!(!OrderError::EmptyOrder.is_transient());
    }
}
