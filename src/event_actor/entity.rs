//! [`ActorEntity`] implementation for [`Event`].
//!
//! The event actor is the serialization point for inventory: every seat sold
//! passes through [`EventAction::Settle`] on this actor, which checks and
//! moves all counters of one order inside a single request.

use super::actions::{
    EventAction, EventActionResult, Quote, SeatAvailability, SettleOutcome,
};
use super::error::EventError;
use crate::model::{
    Event, EventCreate, EventId, EventStatus, EventUpdate, LineItem, OrderId, SettledLine,
    Settlement, TicketSelection, TicketType, TicketTypeDraft, TicketTypeId, TicketTypePatch,
    MAX_TICKET_PRICE,
};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, info};

#[async_trait]
impl ActorEntity for Event {
    type Id = EventId;
    type Create = EventCreate;
    type Update = EventUpdate;
    type Action = EventAction;
    type ActionResult = EventActionResult;
    type Context = ();
    type Error = EventError;

    fn from_create_params(id: EventId, params: EventCreate) -> Result<Self, EventError> {
        let title = params.title.trim();
        if title.is_empty() {
            return Err(EventError::Validation("title is required".into()));
        }
        validate_schedule(params.start, params.end)?;

        let mut event = Event {
            id,
            organizer_id: params.organizer_id,
            title: title.to_string(),
            description: params.description,
            images: params.images,
            location: params.location,
            is_online: params.is_online,
            start: params.start,
            end: params.end,
            status: EventStatus::Draft,
            ticket_types: Vec::new(),
            revenue: Decimal::ZERO,
            tickets_sold: 0,
            created_at: params.created_at,
            settlements: BTreeMap::new(),
            next_ticket_type: 0,
        };
        for draft in params.ticket_types {
            event.add_ticket_type(draft)?;
        }
        if params.publish {
            event.transition(EventStatus::Live)?;
        }
        Ok(event)
    }

    fn action_mutates(action: &EventAction) -> bool {
        !action.is_read_only()
    }

    async fn on_update(&mut self, update: EventUpdate, _ctx: &()) -> Result<(), EventError> {
        if self.status == EventStatus::Closed {
            return Err(EventError::Validation("closed events cannot be edited".into()));
        }
        if let Some(title) = update.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(EventError::Validation("title is required".into()));
            }
            self.title = title.to_string();
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(images) = update.images {
            self.images = images;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(is_online) = update.is_online {
            self.is_online = is_online;
        }
        if let Some(start) = update.start {
            self.start = start;
        }
        if let Some(end) = update.end {
            self.end = end;
        }
        validate_schedule(self.start, self.end)
    }

    async fn handle_action(
        &mut self,
        action: EventAction,
        _ctx: &(),
    ) -> Result<EventActionResult, EventError> {
        match action {
            EventAction::AddTicketType(draft) => {
                if self.status == EventStatus::Closed {
                    return Err(EventError::Validation(
                        "closed events cannot be edited".into(),
                    ));
                }
                self.add_ticket_type(draft)
                    .map(EventActionResult::AddTicketType)
            }
            EventAction::UpdateTicketType { ticket_type, patch } => self
                .patch_ticket_type(ticket_type, patch)
                .map(EventActionResult::UpdateTicketType),
            EventAction::RemoveTicketType(ticket_type) => {
                let index = self
                    .ticket_types
                    .iter()
                    .position(|t| t.id == ticket_type)
                    .ok_or(EventError::UnknownTicketType(ticket_type))?;
                if self.ticket_types[index].quantity_sold > 0 {
                    return Err(EventError::TicketTypeHasSales(ticket_type));
                }
                if self.ticket_types.len() == 1 && self.status != EventStatus::Draft {
                    return Err(EventError::Validation(format!(
                        "a {} event keeps at least one ticket type",
                        self.status
                    )));
                }
                self.ticket_types.remove(index);
                Ok(EventActionResult::RemoveTicketType(()))
            }
            EventAction::Transition(next) => {
                self.transition(next).map(EventActionResult::Transition)
            }
            EventAction::SyncStatus { now } => Ok(EventActionResult::SyncStatus(self.sync_status(now))),
            EventAction::Quote { selections, now } => {
                self.quote(&selections, now).map(EventActionResult::Quote)
            }
            EventAction::Settle {
                order_id,
                items,
                amount,
            } => self
                .settle(order_id, &items, amount)
                .map(EventActionResult::Settle),
            EventAction::Release { order_id } => Ok(EventActionResult::Release(self.release(order_id))),
            EventAction::Availability => Ok(EventActionResult::Availability(
                self.ticket_types
                    .iter()
                    .map(|t| SeatAvailability {
                        ticket_type: t.id,
                        name: t.name.clone(),
                        price: t.price,
                        currency: t.currency.clone(),
                        available: t.available(),
                        total: t.quantity_total,
                    })
                    .collect(),
            )),
        }
    }
}

impl Event {
    fn add_ticket_type(&mut self, draft: TicketTypeDraft) -> Result<TicketTypeId, EventError> {
        validate_draft(&draft)?;
        let id = self.allocate_ticket_type_id();
        self.ticket_types.push(TicketType::from_draft(id, draft));
        Ok(id)
    }

    fn patch_ticket_type(
        &mut self,
        id: TicketTypeId,
        patch: TicketTypePatch,
    ) -> Result<TicketType, EventError> {
        let ticket = self
            .ticket_type_mut(id)
            .ok_or(EventError::UnknownTicketType(id))?;

        if let Some(name) = patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(EventError::Validation("ticket type name is required".into()));
            }
            ticket.name = name.to_string();
        }
        if let Some(total) = patch.quantity_total {
            if total == 0 {
                return Err(EventError::Validation(
                    "ticket type needs a quantity of at least 1".into(),
                ));
            }
            if total < ticket.quantity_sold {
                return Err(EventError::TotalBelowSold {
                    ticket_type: id,
                    sold: ticket.quantity_sold,
                });
            }
            ticket.quantity_total = total;
        }
        if let Some(price) = patch.price {
            validate_price(price)?;
            ticket.price = price;
        }
        if let Some(is_free) = patch.is_free {
            ticket.is_free = is_free;
        }
        if ticket.is_free {
            ticket.price = Decimal::ZERO;
        }
        Ok(ticket.clone())
    }

    fn transition(&mut self, next: EventStatus) -> Result<EventStatus, EventError> {
        if !self.status.can_transition_to(next) {
            return Err(EventError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        if next == EventStatus::Live && self.ticket_types.is_empty() {
            return Err(EventError::Validation(
                "an event needs at least one ticket type to go live".into(),
            ));
        }
        info!(event_id = %self.id, from = %self.status, to = %next, "Event status changed");
        self.status = next;
        Ok(next)
    }

    fn sync_status(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == EventStatus::Live && self.has_ended_at(now) {
            info!(event_id = %self.id, end = %self.effective_end(), "Event ended");
            self.status = EventStatus::Ended;
            return true;
        }
        false
    }

    fn quote(&self, selections: &[TicketSelection], now: DateTime<Utc>) -> Result<Quote, EventError> {
        self.ensure_on_sale(now)?;
        let wanted = merge_quantities(selections.iter().map(|s| (s.ticket_type, s.quantity)))?;

        let mut currency: Option<&str> = None;
        let mut items = Vec::with_capacity(wanted.len());
        let mut subtotal = Decimal::ZERO;
        for (id, quantity) in wanted {
            let ticket = self
                .ticket_type(id)
                .ok_or(EventError::UnknownTicketType(id))?;
            match currency {
                Some(c) if c != ticket.currency => return Err(EventError::MixedCurrency),
                _ => currency = Some(&ticket.currency),
            }
            if quantity > ticket.available() {
                return Err(EventError::InsufficientInventory {
                    ticket_type: id,
                    requested: quantity,
                    available: ticket.available(),
                });
            }
            let item = LineItem {
                ticket_type: id,
                name: ticket.name.clone(),
                quantity,
                unit_price: ticket.price,
            };
            subtotal = item
                .line_total()
                .and_then(|line| subtotal.checked_add(line))
                .ok_or_else(|| EventError::Validation("order total is too large".into()))?;
            items.push(item);
        }

        Ok(Quote {
            event_id: self.id,
            organizer_id: self.organizer_id,
            currency: currency.unwrap_or_default().to_string(),
            items,
            subtotal,
        })
    }

    fn ensure_on_sale(&self, now: DateTime<Utc>) -> Result<(), EventError> {
        if self.status != EventStatus::Live {
            return Err(EventError::NotOnSale(self.status));
        }
        if self.has_ended_at(now) {
            return Err(EventError::NotOnSale(EventStatus::Ended));
        }
        Ok(())
    }

    fn settle(
        &mut self,
        order_id: OrderId,
        items: &[SettledLine],
        amount: Decimal,
    ) -> Result<SettleOutcome, EventError> {
        if self.is_settled(order_id) {
            debug!(event_id = %self.id, %order_id, "Settlement replayed");
            return Ok(SettleOutcome { replayed: true });
        }
        if self.status != EventStatus::Live {
            return Err(EventError::NotOnSale(self.status));
        }
        if amount < Decimal::ZERO {
            return Err(EventError::Validation("settled amount cannot be negative".into()));
        }
        let wanted = merge_quantities(items.iter().map(|l| (l.ticket_type, l.quantity)))?;
        let revenue = self
            .revenue
            .checked_add(amount)
            .ok_or_else(|| EventError::Validation("event revenue is too large".into()))?;

        // Check every line before touching any counter.
        for &(id, quantity) in &wanted {
            let ticket = self
                .ticket_type(id)
                .ok_or(EventError::UnknownTicketType(id))?;
            let fits = ticket
                .quantity_sold
                .checked_add(quantity)
                .is_some_and(|sold| sold <= ticket.quantity_total);
            if !fits {
                return Err(EventError::InsufficientInventory {
                    ticket_type: id,
                    requested: quantity,
                    available: ticket.available(),
                });
            }
        }

        let mut seats = 0u32;
        for &(id, quantity) in &wanted {
            if let Some(ticket) = self.ticket_type_mut(id) {
                ticket.quantity_sold += quantity;
                seats = seats.saturating_add(quantity);
            }
        }
        self.tickets_sold = self.tickets_sold.saturating_add(seats);
        self.revenue = revenue;
        self.settlements.insert(
            order_id,
            Settlement {
                lines: wanted
                    .into_iter()
                    .map(|(ticket_type, quantity)| SettledLine {
                        ticket_type,
                        quantity,
                    })
                    .collect(),
                amount,
            },
        );
        info!(event_id = %self.id, %order_id, seats, %amount, "Order settled");
        Ok(SettleOutcome { replayed: false })
    }

    fn release(&mut self, order_id: OrderId) -> bool {
        let Some(settlement) = self.settlements.remove(&order_id) else {
            return false;
        };
        for line in &settlement.lines {
            if let Some(ticket) = self.ticket_type_mut(line.ticket_type) {
                ticket.quantity_sold = ticket.quantity_sold.saturating_sub(line.quantity);
            }
        }
        self.tickets_sold = self.tickets_sold.saturating_sub(settlement.seats());
        self.revenue -= settlement.amount;
        info!(event_id = %self.id, %order_id, seats = settlement.seats(), "Settlement released");
        true
    }
}

fn validate_schedule(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Result<(), EventError> {
    match end {
        Some(end) if end <= start => Err(EventError::Validation(
            "event must end after it starts".into(),
        )),
        _ => Ok(()),
    }
}

fn validate_draft(draft: &TicketTypeDraft) -> Result<(), EventError> {
    if draft.name.trim().is_empty() {
        return Err(EventError::Validation("ticket type name is required".into()));
    }
    if draft.quantity_total == 0 {
        return Err(EventError::Validation(format!(
            "ticket type {:?} needs a quantity of at least 1",
            draft.name.trim()
        )));
    }
    validate_price(draft.price)?;
    if draft.currency.trim().is_empty() {
        return Err(EventError::Validation("currency is required".into()));
    }
    Ok(())
}

fn validate_price(price: Decimal) -> Result<(), EventError> {
    if price < Decimal::ZERO {
        return Err(EventError::Validation("price cannot be negative".into()));
    }
    if price > Decimal::from(MAX_TICKET_PRICE) {
        return Err(EventError::Validation(format!(
            "price cannot exceed {MAX_TICKET_PRICE}"
        )));
    }
    Ok(())
}

/// Rejects empty input and zero quantities; folds repeated ticket types into
/// one entry, keeping first-seen order.
fn merge_quantities(
    lines: impl Iterator<Item = (TicketTypeId, u32)>,
) -> Result<Vec<(TicketTypeId, u32)>, EventError> {
    let mut merged: Vec<(TicketTypeId, u32)> = Vec::new();
    for (id, quantity) in lines {
        if quantity == 0 {
            return Err(EventError::ZeroQuantity(id));
        }
        match merged.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, total)) => *total = total.saturating_add(quantity),
            None => merged.push((id, quantity)),
        }
    }
    if merged.is_empty() {
        return Err(EventError::EmptySelection);
    }
    Ok(merged)
}
