//! Custom actions for the Event actor.
//!
//! Ticket-type management, status transitions, pricing, and the settlement
//! pair `Settle`/`Release` that every paid order goes through.

use crate::model::{
    EventId, EventStatus, LineItem, OrderId, SettledLine, TicketSelection, TicketTypeDraft,
    TicketTypeId, TicketTypePatch, UserId,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone)]
pub enum EventAction {
    AddTicketType(TicketTypeDraft),
    UpdateTicketType {
        ticket_type: TicketTypeId,
        patch: TicketTypePatch,
    },
    /// Only allowed while nothing of that type has sold.
    RemoveTicketType(TicketTypeId),
    Transition(EventStatus),
    /// `Live -> Ended` once `now` is past the effective end. Never reverses.
    SyncStatus { now: DateTime<Utc> },
    /// Price a selection against current ticket types. Read-only.
    Quote {
        selections: Vec<TicketSelection>,
        now: DateTime<Utc>,
    },
    /// Sell the seats of one paid order, all or nothing. A second settle for
    /// the same order changes nothing.
    Settle {
        order_id: OrderId,
        items: Vec<SettledLine>,
        amount: Decimal,
    },
    /// Undo one order's settlement, if there is one.
    Release { order_id: OrderId },
    /// Remaining seats per ticket type. Read-only.
    Availability,
}

impl EventAction {
    pub fn is_read_only(&self) -> bool {
        matches!(self, EventAction::Quote { .. } | EventAction::Availability)
    }
}

/// Results from EventActions - variants match 1:1 with EventAction
#[derive(Debug, Clone)]
pub enum EventActionResult {
    AddTicketType(TicketTypeId),
    UpdateTicketType(crate::model::TicketType),
    RemoveTicketType(()),
    Transition(EventStatus),
    /// Whether the status changed.
    SyncStatus(bool),
    Quote(Quote),
    Settle(SettleOutcome),
    /// Whether a settlement was found and reversed.
    Release(bool),
    Availability(Vec<SeatAvailability>),
}

/// A priced selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub event_id: EventId,
    pub organizer_id: UserId,
    pub currency: String,
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleOutcome {
    /// The order had already been settled; nothing moved.
    pub replayed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatAvailability {
    pub ticket_type: TicketTypeId,
    pub name: String,
    pub price: Decimal,
    pub currency: String,
    pub available: u32,
    pub total: u32,
}
