//! Events, their ticket types, and the settlement ledger.
//!
//! # Actor Framework
//! [`Event`] is managed by a [`ResourceActor`](actor_framework::ResourceActor);
//! see [`crate::event_actor`] for the hooks and actions.

use crate::model::{EventId, OrderId, TicketTypeId, UserId};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How long an event without an explicit end is considered to run.
pub const DEFAULT_EVENT_LENGTH_HOURS: i64 = 24;

/// Highest unit price a ticket type accepts, in the ticket's currency.
pub const MAX_TICKET_PRICE: i64 = 1_000_000_000;

/// Publication status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Live,
    Ended,
    Closed,
}

impl EventStatus {
    /// Allowed moves: `Draft -> Live | Closed`, `Live -> Ended | Closed`,
    /// `Ended -> Closed`. Nothing returns to `Live`.
    pub fn can_transition_to(self, next: EventStatus) -> bool {
        use EventStatus::*;
        matches!(
            (self, next),
            (Draft, Live) | (Draft, Closed) | (Live, Ended) | (Live, Closed) | (Ended, Closed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Live => "live",
            EventStatus::Ended => "ended",
            EventStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, priced inventory bucket within an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketType {
    pub id: TicketTypeId,
    pub name: String,
    pub price: Decimal,
    pub currency: String,
    pub quantity_total: u32,
    pub quantity_sold: u32,
    pub is_free: bool,
}

impl TicketType {
    /// Builds a ticket type from a draft. A free ticket is always priced zero.
    pub fn from_draft(id: TicketTypeId, draft: TicketTypeDraft) -> Self {
        let price = if draft.is_free { Decimal::ZERO } else { draft.price };
        Self {
            id,
            name: draft.name.trim().to_string(),
            price,
            currency: draft.currency.trim().to_uppercase(),
            quantity_total: draft.quantity_total,
            quantity_sold: 0,
            is_free: draft.is_free,
        }
    }

    pub fn available(&self) -> u32 {
        self.quantity_total.saturating_sub(self.quantity_sold)
    }

    pub fn is_sold_out(&self) -> bool {
        self.available() == 0
    }
}

/// Input for a new ticket type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketTypeDraft {
    pub name: String,
    pub price: Decimal,
    pub currency: String,
    pub quantity_total: u32,
    pub is_free: bool,
}

impl TicketTypeDraft {
    pub fn paid(name: &str, price: Decimal, currency: &str, quantity_total: u32) -> Self {
        Self {
            name: name.to_string(),
            price,
            currency: currency.to_string(),
            quantity_total,
            is_free: false,
        }
    }

    pub fn free(name: &str, currency: &str, quantity_total: u32) -> Self {
        Self {
            name: name.to_string(),
            price: Decimal::ZERO,
            currency: currency.to_string(),
            quantity_total,
            is_free: true,
        }
    }
}

/// Partial edit of a ticket type. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketTypePatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub quantity_total: Option<u32>,
    pub is_free: Option<bool>,
}

/// One ticket type's share of a settled order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettledLine {
    pub ticket_type: TicketTypeId,
    pub quantity: u32,
}

/// What one paid order contributed to the event's counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub lines: Vec<SettledLine>,
    pub amount: Decimal,
}

impl Settlement {
    pub fn seats(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub organizer_id: UserId,
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    pub location: String,
    pub is_online: bool,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub status: EventStatus,
    pub ticket_types: Vec<TicketType>,
    pub revenue: Decimal,
    pub tickets_sold: u32,
    pub created_at: DateTime<Utc>,
    /// Every settled order, keyed by order id. Makes settlement idempotent.
    pub settlements: BTreeMap<OrderId, Settlement>,
    #[serde(skip)]
    pub(crate) next_ticket_type: u32,
}

impl Event {
    /// Sum of every ticket type's total.
    pub fn capacity(&self) -> u32 {
        self.ticket_types.iter().map(|t| t.quantity_total).sum()
    }

    /// The explicit end, or 24 hours after the start when none is set.
    pub fn effective_end(&self) -> DateTime<Utc> {
        self.end
            .unwrap_or_else(|| self.start + Duration::hours(DEFAULT_EVENT_LENGTH_HOURS))
    }

    /// True strictly after the effective end.
    pub fn has_ended_at(&self, now: DateTime<Utc>) -> bool {
        now > self.effective_end()
    }

    pub fn is_on_sale_at(&self, now: DateTime<Utc>) -> bool {
        self.status == EventStatus::Live && !self.has_ended_at(now)
    }

    pub fn ticket_type(&self, id: TicketTypeId) -> Option<&TicketType> {
        self.ticket_types.iter().find(|t| t.id == id)
    }

    pub(crate) fn ticket_type_mut(&mut self, id: TicketTypeId) -> Option<&mut TicketType> {
        self.ticket_types.iter_mut().find(|t| t.id == id)
    }

    pub fn is_settled(&self, order_id: OrderId) -> bool {
        self.settlements.contains_key(&order_id)
    }

    /// Lowest price among ticket types, for listings.
    pub fn starting_price(&self) -> Option<Decimal> {
        self.ticket_types.iter().map(|t| t.price).min()
    }

    pub(crate) fn allocate_ticket_type_id(&mut self) -> TicketTypeId {
        self.next_ticket_type += 1;
        TicketTypeId(self.next_ticket_type)
    }
}

/// Payload for creating an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventCreate {
    pub organizer_id: UserId,
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    pub location: String,
    pub is_online: bool,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub ticket_types: Vec<TicketTypeDraft>,
    /// Create as `Live` instead of `Draft`.
    pub publish: bool,
    pub created_at: DateTime<Utc>,
}

/// Partial edit of an event's details. `end: Some(None)` clears the end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub location: Option<String>,
    pub is_online: Option<bool>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<Option<DateTime<Utc>>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, h, 0, 0).unwrap()
    }

    fn event(end: Option<DateTime<Utc>>) -> Event {
        Event {
            id: EventId(1),
            organizer_id: UserId(1),
            title: "Jazz Night".into(),
            description: String::new(),
            images: vec![],
            location: "Lagos".into(),
            is_online: false,
            start: at(18),
            end,
            status: EventStatus::Live,
            ticket_types: vec![
                TicketType::from_draft(
                    TicketTypeId(1),
                    TicketTypeDraft::paid("VIP", Decimal::new(5000, 2), "ngn", 10),
                ),
                TicketType::from_draft(TicketTypeId(2), TicketTypeDraft::free("Floor", "NGN", 90)),
            ],
            revenue: Decimal::ZERO,
            tickets_sold: 0,
            created_at: at(1),
            settlements: BTreeMap::new(),
            next_ticket_type: 2,
        }
    }

    #[test]
    fn transition_table() {
        use EventStatus::*;
        assert!(Draft.can_transition_to(Live));
        assert!(Live.can_transition_to(Ended));
        assert!(Ended.can_transition_to(Closed));
        assert!(!Ended.can_transition_to(Live));
        assert!(!Closed.can_transition_to(Live));
        assert!(!Live.can_transition_to(Draft));
        assert!(!Live.can_transition_to(Live));
    }

    #[test]
    fn end_falls_back_to_start_plus_a_day() {
        let e = event(None);
        assert_eq!(e.effective_end(), at(18) + Duration::hours(24));

        let e = event(Some(at(22)));
        assert_eq!(e.effective_end(), at(22));
    }

    #[test]
    fn ended_only_strictly_after_the_end() {
        let e = event(Some(at(22)));
        assert!(!e.has_ended_at(at(22)));
        assert!(e.has_ended_at(at(22) + Duration::seconds(1)));
        assert!(e.is_on_sale_at(at(20)));
        assert!(!e.is_on_sale_at(at(23)));
    }

    #[test]
    fn free_tickets_are_priced_zero_and_currency_is_normalized() {
        let tt = TicketType::from_draft(
            TicketTypeId(3),
            TicketTypeDraft {
                name: " Guest ".into(),
                price: Decimal::from(20),
                currency: "usd".into(),
                quantity_total: 5,
                is_free: true,
            },
        );
        assert_eq!(tt.price, Decimal::ZERO);
        assert_eq!(tt.currency, "USD");
        assert_eq!(tt.name, "Guest");
    }

    #[test]
    fn capacity_and_starting_price() {
        let mut e = event(None);
        assert_eq!(e.capacity(), 100);
        assert_eq!(e.starting_price(), Some(Decimal::ZERO));
        e.ticket_types[0].quantity_sold = 10;
        assert!(e.ticket_types[0].is_sold_out());
        assert_eq!(e.ticket_types[1].available(), 90);
    }
}
