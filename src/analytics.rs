//! Aggregation for the organizer dashboard. Pure functions over snapshots;
//! nothing here talks to an actor.

use crate::model::{Event, EventStatus, Order};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub revenue: Decimal,
    pub tickets_sold: u32,
    /// Events on sale at the time of the summary.
    pub live_events: usize,
    pub total_events: usize,
}

pub fn summarize(events: &[Event], now: DateTime<Utc>) -> Summary {
    Summary {
        revenue: events
            .iter()
            .fold(Decimal::ZERO, |sum, e| sum.saturating_add(e.revenue)),
        tickets_sold: events
            .iter()
            .fold(0u32, |sum, e| sum.saturating_add(e.tickets_sold)),
        live_events: events.iter().filter(|e| e.is_on_sale_at(now)).count(),
        total_events: events.len(),
    }
}

/// Dashboard tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventFilter {
    #[default]
    All,
    Live,
    Draft,
    /// Marked ended, or still marked live but past the end.
    Ended,
}

impl EventFilter {
    pub fn matches(self, event: &Event, now: DateTime<Utc>) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Live => event.is_on_sale_at(now),
            EventFilter::Draft => event.status == EventStatus::Draft,
            EventFilter::Ended => {
                event.status == EventStatus::Ended
                    || (event.status == EventStatus::Live && event.has_ended_at(now))
            }
        }
    }

    pub fn apply(self, events: Vec<Event>, now: DateTime<Utc>) -> Vec<Event> {
        events
            .into_iter()
            .filter(|e| self.matches(e, now))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub orders: usize,
    pub tickets: u32,
    pub revenue: Decimal,
}

/// Paid and checked-in orders grouped by the UTC date they were placed,
/// oldest day first.
pub fn sales_by_day(orders: &[Order]) -> Vec<DailySales> {
    let mut days: BTreeMap<NaiveDate, DailySales> = BTreeMap::new();
    for order in orders.iter().filter(|o| o.status.is_settled()) {
        let date = order.created_at.date_naive();
        let day = days.entry(date).or_insert_with(|| DailySales {
            date,
            orders: 0,
            tickets: 0,
            revenue: Decimal::ZERO,
        });
        day.orders += 1;
        day.tickets = day.tickets.saturating_add(order.seat_count());
        day.revenue = day.revenue.saturating_add(order.total);
    }
    days.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Buyer, EventId, LineItem, OrderId, OrderStatus, TicketTypeId, UserId,
    };
    use chrono::{Duration, TimeZone};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, day, hour, 0, 0).unwrap()
    }

    fn event(id: u32, status: EventStatus, start: DateTime<Utc>, revenue: i64, sold: u32) -> Event {
        Event {
            id: EventId(id),
            organizer_id: UserId(1),
            title: format!("Event {id}"),
            description: String::new(),
            images: vec![],
            location: "Lagos".into(),
            is_online: false,
            start,
            end: None,
            status,
            ticket_types: vec![],
            revenue: Decimal::from(revenue),
            tickets_sold: sold,
            created_at: start - Duration::days(30),
            settlements: Default::default(),
            next_ticket_type: 0,
        }
    }

    fn order(id: u32, status: OrderStatus, created_at: DateTime<Utc>, seats: u32, total: i64) -> Order {
        Order {
            id: OrderId(id),
            event_id: EventId(1),
            organizer_id: UserId(1),
            buyer: Buyer {
                user_id: UserId(2),
                name: "Ada".into(),
                email: "ada@example.com".into(),
            },
            items: vec![LineItem {
                ticket_type: TicketTypeId(1),
                name: "Entry".into(),
                quantity: seats,
                unit_price: Decimal::from(total) / Decimal::from(seats),
            }],
            subtotal: Decimal::from(total),
            discount: None,
            total: Decimal::from(total),
            currency: "NGN".into(),
            status,
            created_at,
            paid_at: None,
            payment_ref: None,
            qr_tokens: vec![],
            checked_in_at: None,
            cancelled_at: None,
            requested_code: None,
        }
    }

    #[test]
    fn summary_counts_only_events_on_sale_as_live() {
        let now = at(10, 12);
        let events = vec![
            event(1, EventStatus::Live, at(11, 20), 100, 4),
            // Live, but its 24h default window closed yesterday.
            event(2, EventStatus::Live, at(8, 20), 50, 2),
            event(3, EventStatus::Draft, at(20, 20), 0, 0),
        ];
        let summary = summarize(&events, now);
        assert_eq!(summary.revenue, Decimal::from(150));
        assert_eq!(summary.tickets_sold, 6);
        assert_eq!(summary.live_events, 1);
        assert_eq!(summary.total_events, 3);
    }

    #[test]
    fn ended_tab_includes_live_events_past_their_end() {
        let now = at(10, 12);
        let events = vec![
            event(1, EventStatus::Live, at(11, 20), 0, 0),
            event(2, EventStatus::Live, at(8, 20), 0, 0),
            event(3, EventStatus::Ended, at(1, 20), 0, 0),
            event(4, EventStatus::Draft, at(20, 20), 0, 0),
        ];
        let ids = |filter: EventFilter| -> Vec<u32> {
            filter
                .apply(events.clone(), now)
                .iter()
                .map(|e| e.id.0)
                .collect()
        };
        assert_eq!(ids(EventFilter::All), vec![1, 2, 3, 4]);
        assert_eq!(ids(EventFilter::Live), vec![1]);
        assert_eq!(ids(EventFilter::Ended), vec![2, 3]);
        assert_eq!(ids(EventFilter::Draft), vec![4]);
    }

    #[test]
    fn sales_group_settled_orders_by_day() {
        let orders = vec![
            order(1, OrderStatus::Paid, at(3, 9), 2, 40),
            order(2, OrderStatus::Pending, at(3, 10), 5, 100),
            order(3, OrderStatus::CheckedIn, at(2, 23), 1, 20),
            order(4, OrderStatus::Paid, at(3, 18), 1, 20),
            order(5, OrderStatus::Cancelled, at(2, 8), 1, 20),
        ];
        let days = sales_by_day(&orders);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, at(2, 0).date_naive());
        assert_eq!(days[0].orders, 1);
        assert_eq!(days[1].tickets, 3);
        assert_eq!(days[1].revenue, Decimal::from(60));
    }
}
