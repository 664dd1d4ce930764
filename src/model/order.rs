//! Orders, their line items and per-seat check-in tokens.
//!
//! # Actor Framework
//! [`Order`] is managed by a [`ResourceActor`](actor_framework::ResourceActor)
//! whose context holds the event and discount clients; see
//! [`crate::order_actor`].

use crate::model::{DiscountId, EventId, OrderId, TicketTypeId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Paid,
    CheckedIn,
    Cancelled,
}

impl OrderStatus {
    /// Allowed moves: `Pending -> Paid | Cancelled`, `Paid -> CheckedIn |
    /// Cancelled`.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Paid) | (Pending, Cancelled) | (Paid, CheckedIn) | (Paid, Cancelled)
        )
    }

    /// Paid or checked in: the seats are sold.
    pub fn is_settled(self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::CheckedIn)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::CheckedIn => "checked-in",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the buyer taken when the order is placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Buyer {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
}

/// What a shopper asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketSelection {
    pub ticket_type: TicketTypeId,
    pub quantity: u32,
}

impl TicketSelection {
    pub fn new(ticket_type: TicketTypeId, quantity: u32) -> Self {
        Self {
            ticket_type,
            quantity,
        }
    }
}

/// One priced line. `unit_price` is fixed when the order is placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub ticket_type: TicketTypeId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl LineItem {
    /// `None` when the product does not fit a `Decimal`.
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    pub discount_id: DiscountId,
    pub code: String,
    pub amount_off: Decimal,
}

/// Admits one seat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrToken {
    pub token: String,
    pub ticket_type: TicketTypeId,
    pub checked_in_at: Option<DateTime<Utc>>,
}

impl QrToken {
    pub fn is_used(&self) -> bool {
        self.checked_in_at.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub event_id: EventId,
    pub organizer_id: UserId,
    pub buyer: Buyer,
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
    pub discount: Option<AppliedDiscount>,
    pub total: Decimal,
    pub currency: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_ref: Option<String>,
    pub qr_tokens: Vec<QrToken>,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Code entered at checkout, held until the order actor prices it.
    #[serde(skip)]
    pub(crate) requested_code: Option<String>,
}

impl Order {
    pub fn seat_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn token(&self, token: &str) -> Option<&QrToken> {
        self.qr_tokens.iter().find(|t| t.token == token)
    }

    /// Case-insensitive match on order id, buyer e-mail or buyer name.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.id.to_string().contains(&query)
            || self.buyer.email.to_lowercase().contains(&query)
            || self.buyer.name.to_lowercase().contains(&query)
    }
}

/// Payload for placing an order. Prices come from the event, not the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub event_id: EventId,
    pub buyer: Buyer,
    pub selections: Vec<TicketSelection>,
    pub discount_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Orders have no free-form edits; every change is an
/// [`OrderAction`](crate::order_actor::OrderAction).
#[derive(Debug, Clone)]
pub enum OrderUpdate {}
