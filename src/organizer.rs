//! # Organizer Desk
//!
//! Back-office operations. Every call names the acting user; it must be an
//! organizer, and the event, discount or order it touches must be theirs.

use crate::analytics::{sales_by_day, summarize, DailySales, EventFilter, Summary};
use crate::clients::{DiscountClient, EventClient, OrderClient, OrderWatch, UserClient};
use crate::clock::Clock;
use crate::discount_actor::DiscountError;
use crate::event_actor::EventError;
use crate::model::{
    Discount, DiscountCreate, DiscountId, DiscountKind, Event, EventCreate, EventId, EventStatus,
    EventUpdate, Order, OrderId, OrderStatus, TicketType, TicketTypeDraft, TicketTypeId,
    TicketTypePatch, User, UserId,
};
use crate::order_actor::OrderError;
use crate::user_actor::UserError;
use actor_framework::ActorClient;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DeskError {
    #[error("{0} is not allowed to do this")]
    Forbidden(UserId),

    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Discount(#[from] DiscountError),
}

impl DeskError {
    pub fn is_transient(&self) -> bool {
        match self {
            DeskError::Forbidden(_) => false,
            DeskError::User(e) => e.is_transient(),
            DeskError::Event(e) => e.is_transient(),
            DeskError::Order(e) => e.is_transient(),
            DeskError::Discount(e) => e.is_transient(),
        }
    }
}

/// Filter for an event's order list.
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    /// Matched against order id, buyer e-mail and buyer name.
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub summary: Summary,
    pub events: Vec<Event>,
    pub sales_by_day: Vec<DailySales>,
}

#[derive(Clone)]
pub struct OrganizerDesk {
    users: UserClient,
    events: EventClient,
    discounts: DiscountClient,
    orders: OrderClient,
    clock: Arc<dyn Clock>,
    default_currency: String,
}

impl OrganizerDesk {
    pub fn new(
        users: UserClient,
        events: EventClient,
        discounts: DiscountClient,
        orders: OrderClient,
        clock: Arc<dyn Clock>,
        default_currency: &str,
    ) -> Self {
        Self {
            users,
            events,
            discounts,
            orders,
            clock,
            default_currency: default_currency.to_string(),
        }
    }

    // Events

    /// Create an event owned by `actor`. Ticket types without a currency get
    /// the configured default.
    #[instrument(skip(self, params), fields(title = %params.title))]
    pub async fn create_event(&self, actor: UserId, mut params: EventCreate) -> Result<Event, DeskError> {
        self.organizer(actor).await?;
        params.organizer_id = actor;
        params.created_at = self.clock.now();
        for draft in &mut params.ticket_types {
            self.fill_currency(draft);
        }
        let id = self.events.create_event(params).await?;
        Ok(self.events.fetch(id).await?)
    }

    #[instrument(skip(self))]
    pub async fn edit_event(
        &self,
        actor: UserId,
        id: EventId,
        update: EventUpdate,
    ) -> Result<Event, DeskError> {
        self.owned_event(actor, id).await?;
        Ok(self.events.update_event(id, update).await?)
    }

    #[instrument(skip(self))]
    pub async fn publish(&self, actor: UserId, id: EventId) -> Result<EventStatus, DeskError> {
        self.owned_event(actor, id).await?;
        Ok(self.events.transition(id, EventStatus::Live).await?)
    }

    #[instrument(skip(self))]
    pub async fn close(&self, actor: UserId, id: EventId) -> Result<EventStatus, DeskError> {
        self.owned_event(actor, id).await?;
        Ok(self.events.transition(id, EventStatus::Closed).await?)
    }

    // Ticket types

    #[instrument(skip(self))]
    pub async fn add_ticket_type(
        &self,
        actor: UserId,
        event_id: EventId,
        mut draft: TicketTypeDraft,
    ) -> Result<TicketTypeId, DeskError> {
        self.owned_event(actor, event_id).await?;
        self.fill_currency(&mut draft);
        Ok(self.events.add_ticket_type(event_id, draft).await?)
    }

    #[instrument(skip(self))]
    pub async fn update_ticket_type(
        &self,
        actor: UserId,
        event_id: EventId,
        ticket_type: TicketTypeId,
        patch: TicketTypePatch,
    ) -> Result<TicketType, DeskError> {
        self.owned_event(actor, event_id).await?;
        Ok(self
            .events
            .update_ticket_type(event_id, ticket_type, patch)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn remove_ticket_type(
        &self,
        actor: UserId,
        event_id: EventId,
        ticket_type: TicketTypeId,
    ) -> Result<(), DeskError> {
        self.owned_event(actor, event_id).await?;
        Ok(self.events.remove_ticket_type(event_id, ticket_type).await?)
    }

    // Discounts

    #[instrument(skip(self))]
    pub async fn create_discount(
        &self,
        actor: UserId,
        code: &str,
        kind: DiscountKind,
        value: Decimal,
        usage_limit: u32,
    ) -> Result<Discount, DeskError> {
        self.organizer(actor).await?;
        let id = self
            .discounts
            .create_discount(DiscountCreate {
                organizer_id: actor,
                code: code.to_string(),
                kind,
                value,
                usage_limit,
                created_at: self.clock.now(),
            })
            .await?;
        self.discounts
            .get(id)
            .await?
            .ok_or_else(|| DiscountError::NotFound(id.to_string()).into())
    }

    #[instrument(skip(self))]
    pub async fn discounts(&self, actor: UserId) -> Result<Vec<Discount>, DeskError> {
        self.organizer(actor).await?;
        Ok(self.discounts.list_for_organizer(actor).await?)
    }

    /// Delete a code. Orders that already redeemed it keep their discount.
    #[instrument(skip(self))]
    pub async fn delete_discount(&self, actor: UserId, id: DiscountId) -> Result<(), DeskError> {
        self.organizer(actor).await?;
        let discount = self
            .discounts
            .get(id)
            .await?
            .ok_or_else(|| DiscountError::NotFound(id.to_string()))?;
        if discount.organizer_id != actor {
            return Err(DeskError::Forbidden(actor));
        }
        self.discounts.delete(id).await?;
        info!(%id, code = %discount.code, "Discount deleted");
        Ok(())
    }

    // Orders

    /// An event's orders, newest first, narrowed by status and text.
    #[instrument(skip(self))]
    pub async fn orders(
        &self,
        actor: UserId,
        event_id: EventId,
        query: OrderQuery,
    ) -> Result<Vec<Order>, DeskError> {
        self.owned_event(actor, event_id).await?;
        let orders = self.orders.orders_for_event(event_id).await?;
        Ok(orders
            .into_iter()
            .filter(|o| query.status.map_or(true, |s| o.status == s))
            .filter(|o| query.text.as_deref().map_or(true, |t| o.matches_query(t)))
            .collect())
    }

    /// Live view of an event's orders. Dropping the watch unsubscribes.
    #[instrument(skip(self))]
    pub async fn watch_orders(&self, actor: UserId, event_id: EventId) -> Result<OrderWatch, DeskError> {
        self.owned_event(actor, event_id).await?;
        Ok(self.orders.watch_event(event_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn cancel_order(&self, actor: UserId, id: OrderId) -> Result<Order, DeskError> {
        self.owned_order(actor, id).await?;
        Ok(self.orders.cancel(id, self.clock.now()).await?)
    }

    /// Box-office check-in of a whole order.
    #[instrument(skip(self))]
    pub async fn check_in(&self, actor: UserId, id: OrderId) -> Result<Order, DeskError> {
        self.owned_order(actor, id).await?;
        Ok(self.orders.check_in(id, self.clock.now()).await?)
    }

    /// Admit the seat behind a scanned token.
    #[instrument(skip(self, token))]
    pub async fn scan_token(&self, actor: UserId, token: &str) -> Result<Order, DeskError> {
        self.organizer(actor).await?;
        let order = self
            .orders
            .find_by_token(token)
            .await?
            .ok_or_else(|| OrderError::UnknownToken(token.trim().to_string()))?;
        if order.organizer_id != actor {
            return Err(DeskError::Forbidden(actor));
        }
        Ok(self
            .orders
            .check_in_token(order.id, token.trim(), self.clock.now())
            .await?)
    }

    // Dashboard

    /// Summary, the filtered event list and daily sales for `actor`.
    ///
    /// Live events found past their end are moved to `Ended` first, so the
    /// figures never show an ended event as live.
    #[instrument(skip(self))]
    pub async fn dashboard(&self, actor: UserId, filter: EventFilter) -> Result<Dashboard, DeskError> {
        self.organizer(actor).await?;
        let now = self.clock.now();

        let stale = self
            .events
            .list_where(move |e: &Event| {
                e.organizer_id == actor && e.status == EventStatus::Live && e.has_ended_at(now)
            })
            .await?;
        for event in &stale {
            if let Err(err) = self.events.sync_status(event.id, now).await {
                warn!(event_id = %event.id, error = %err, "Status sync failed");
            }
        }

        let mut events = self
            .events
            .list_where(move |e: &Event| e.organizer_id == actor)
            .await?;
        events.sort_by(|a, b| b.start.cmp(&a.start));
        let orders = self.orders.orders_for_organizer(actor).await?;

        Ok(Dashboard {
            summary: summarize(&events, now),
            events: filter.apply(events, now),
            sales_by_day: sales_by_day(&orders),
        })
    }

    async fn organizer(&self, actor: UserId) -> Result<User, DeskError> {
        let user = self.users.fetch(actor).await?;
        if !user.is_organizer() {
            return Err(DeskError::Forbidden(actor));
        }
        Ok(user)
    }

    async fn owned_event(&self, actor: UserId, id: EventId) -> Result<Event, DeskError> {
        self.organizer(actor).await?;
        let event = self.events.fetch(id).await?;
        if event.organizer_id != actor {
            return Err(DeskError::Forbidden(actor));
        }
        Ok(event)
    }

    async fn owned_order(&self, actor: UserId, id: OrderId) -> Result<Order, DeskError> {
        self.organizer(actor).await?;
        let order = self.orders.fetch(id).await?;
        if order.organizer_id != actor {
            return Err(DeskError::Forbidden(actor));
        }
        Ok(order)
    }

    fn fill_currency(&self, draft: &mut TicketTypeDraft) {
        if draft.currency.trim().is_empty() {
            draft.currency = self.default_currency.clone();
        }
    }
}
