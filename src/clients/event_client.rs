//! # Event Client
//!
//! Typed API over `ResourceClient<Event>`. Every custom action has a method
//! returning exactly the payload of its result variant.

use crate::event_actor::{EventAction, EventActionResult, EventError, Quote, SeatAvailability};
use crate::model::{
    Event, EventCreate, EventId, EventStatus, EventUpdate, OrderId, SettledLine, TicketSelection,
    TicketType, TicketTypeDraft, TicketTypeId, TicketTypePatch,
};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

/// Client for interacting with the Event actor.
#[derive(Clone)]
pub struct EventClient {
    inner: ResourceClient<Event>,
}

impl EventClient {
    pub fn new(inner: ResourceClient<Event>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Event> for EventClient {
    type Error = EventError;

    fn inner(&self) -> &ResourceClient<Event> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.downcast_entity::<EventError>() {
            Ok(err) => err,
            Err(FrameworkError::NotFound(id)) => EventError::NotFound(id),
            Err(other) => EventError::Unavailable(other.to_string()),
        }
    }
}

impl EventClient {
    #[instrument(skip(self, params), fields(title = %params.title))]
    pub async fn create_event(&self, params: EventCreate) -> Result<EventId, EventError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    /// Like `get`, but a missing event is an error.
    #[instrument(skip(self))]
    pub async fn fetch(&self, id: EventId) -> Result<Event, EventError> {
        self.get(id)
            .await?
            .ok_or_else(|| EventError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn update_event(&self, id: EventId, update: EventUpdate) -> Result<Event, EventError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    /// Every event passing `filter`, ascending by id.
    pub async fn list_where<F>(&self, filter: F) -> Result<Vec<Event>, EventError>
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        self.inner.list(filter).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn add_ticket_type(
        &self,
        id: EventId,
        draft: TicketTypeDraft,
    ) -> Result<TicketTypeId, EventError> {
        match self.act(id, EventAction::AddTicketType(draft)).await? {
            EventActionResult::AddTicketType(ticket_type) => Ok(ticket_type),
            _ => unreachable!("AddTicketType action must return AddTicketType result"),
        }
    }

    #[instrument(skip(self))]
    pub async fn update_ticket_type(
        &self,
        id: EventId,
        ticket_type: TicketTypeId,
        patch: TicketTypePatch,
    ) -> Result<TicketType, EventError> {
        match self
            .act(id, EventAction::UpdateTicketType { ticket_type, patch })
            .await?
        {
            EventActionResult::UpdateTicketType(updated) => Ok(updated),
            _ => unreachable!("UpdateTicketType action must return UpdateTicketType result"),
        }
    }

    #[instrument(skip(self))]
    pub async fn remove_ticket_type(
        &self,
        id: EventId,
        ticket_type: TicketTypeId,
    ) -> Result<(), EventError> {
        match self
            .act(id, EventAction::RemoveTicketType(ticket_type))
            .await?
        {
            EventActionResult::RemoveTicketType(()) => Ok(()),
            _ => unreachable!("RemoveTicketType action must return RemoveTicketType result"),
        }
    }

    #[instrument(skip(self))]
    pub async fn transition(
        &self,
        id: EventId,
        status: EventStatus,
    ) -> Result<EventStatus, EventError> {
        match self.act(id, EventAction::Transition(status)).await? {
            EventActionResult::Transition(status) => Ok(status),
            _ => unreachable!("Transition action must return Transition result"),
        }
    }

    /// Returns whether the event moved to `Ended`.
    #[instrument(skip(self))]
    pub async fn sync_status(&self, id: EventId, now: DateTime<Utc>) -> Result<bool, EventError> {
        match self.act(id, EventAction::SyncStatus { now }).await? {
            EventActionResult::SyncStatus(changed) => Ok(changed),
            _ => unreachable!("SyncStatus action must return SyncStatus result"),
        }
    }

    #[instrument(skip(self))]
    pub async fn quote(
        &self,
        id: EventId,
        selections: Vec<TicketSelection>,
        now: DateTime<Utc>,
    ) -> Result<Quote, EventError> {
        match self.act(id, EventAction::Quote { selections, now }).await? {
            EventActionResult::Quote(quote) => Ok(quote),
            _ => unreachable!("Quote action must return Quote result"),
        }
    }

    /// Sell the seats of `order_id`. Returns `true` when the order had
    /// already been settled.
    #[instrument(skip(self, items))]
    pub async fn settle(
        &self,
        id: EventId,
        order_id: OrderId,
        items: Vec<SettledLine>,
        amount: Decimal,
    ) -> Result<bool, EventError> {
        debug!(lines = items.len(), %amount, "Settling order");
        match self
            .act(
                id,
                EventAction::Settle {
                    order_id,
                    items,
                    amount,
                },
            )
            .await?
        {
            EventActionResult::Settle(outcome) => Ok(outcome.replayed),
            _ => unreachable!("Settle action must return Settle result"),
        }
    }

    /// Returns whether a settlement was reversed.
    #[instrument(skip(self))]
    pub async fn release(&self, id: EventId, order_id: OrderId) -> Result<bool, EventError> {
        match self.act(id, EventAction::Release { order_id }).await? {
            EventActionResult::Release(released) => Ok(released),
            _ => unreachable!("Release action must return Release result"),
        }
    }

    #[instrument(skip(self))]
    pub async fn availability(&self, id: EventId) -> Result<Vec<SeatAvailability>, EventError> {
        match self.act(id, EventAction::Availability).await? {
            EventActionResult::Availability(seats) => Ok(seats),
            _ => unreachable!("Availability action must return Availability result"),
        }
    }

    async fn act(
        &self,
        id: EventId,
        action: EventAction,
    ) -> Result<EventActionResult, EventError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }
}
