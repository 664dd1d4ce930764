//! Error types for the Event actor.

use crate::model::{EventStatus, TicketTypeId};
use thiserror::Error;

/// Errors that can occur during event operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EventError {
    #[error("Event not found: {0}")]
    NotFound(String),

    #[error("Invalid event: {0}")]
    Validation(String),

    #[error("Cannot move event from {from} to {to}")]
    InvalidTransition { from: EventStatus, to: EventStatus },

    #[error("Event is not on sale (status {0})")]
    NotOnSale(EventStatus),

    #[error("Unknown ticket type: {0}")]
    UnknownTicketType(TicketTypeId),

    #[error("No tickets selected")]
    EmptySelection,

    #[error("Quantity for {0} must be at least 1")]
    ZeroQuantity(TicketTypeId),

    #[error("Selected ticket types are priced in different currencies")]
    MixedCurrency,

    /// Settling would push `quantity_sold` past `quantity_total`.
    #[error("Insufficient inventory for {ticket_type}: requested {requested}, available {available}")]
    InsufficientInventory {
        ticket_type: TicketTypeId,
        requested: u32,
        available: u32,
    },

    #[error("Ticket type {0} has sales and cannot be removed")]
    TicketTypeHasSales(TicketTypeId),

    #[error("Total for {ticket_type} cannot drop below the {sold} already sold")]
    TotalBelowSold { ticket_type: TicketTypeId, sold: u32 },

    /// The event actor could not be reached.
    #[error("Event service unavailable: {0}")]
    Unavailable(String),
}

impl EventError {
    pub fn is_transient(&self) -> bool {
        matches!(self, EventError::Unavailable(_))
    }
}

impl actor_framework::Transient for EventError {
    fn is_transient(&self) -> bool {
        EventError::is_transient(self)
    }
}
