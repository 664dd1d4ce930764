//! # Catalog
//!
//! The public, read-only side of the store. Only events that are `Live` and
//! not yet past their end are listed; drafts are invisible even by id.

use crate::clients::EventClient;
use crate::clock::Clock;
use crate::event_actor::{EventError, SeatAvailability};
use crate::model::{Event, EventId, EventStatus};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

/// What a shopper sees on an event's page.
#[derive(Debug, Clone, Serialize)]
pub struct EventPage {
    pub event: Event,
    pub seats: Vec<SeatAvailability>,
    /// Live and not past its end.
    pub on_sale: bool,
    pub sold_out: bool,
}

#[derive(Clone)]
pub struct Catalog {
    events: EventClient,
    clock: Arc<dyn Clock>,
}

impl Catalog {
    pub fn new(events: EventClient, clock: Arc<dyn Clock>) -> Self {
        Self { events, clock }
    }

    /// Events on sale right now, latest start first.
    #[instrument(skip(self))]
    pub async fn live_events(&self) -> Result<Vec<Event>, EventError> {
        let now = self.clock.now();
        let mut events = self
            .events
            .list_where(move |e: &Event| e.is_on_sale_at(now))
            .await?;
        events.sort_by(|a, b| b.start.cmp(&a.start).then(a.id.cmp(&b.id)));
        Ok(events)
    }

    /// Live events whose title, location or description contains every word
    /// of `query`, ignoring case. A blank query lists everything on sale.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Event>, EventError> {
        let words: Vec<String> = query
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        let events = self.live_events().await?;
        Ok(events
            .into_iter()
            .filter(|e| {
                let haystack =
                    format!("{} {} {}", e.title, e.location, e.description).to_lowercase();
                words.iter().all(|w| haystack.contains(w.as_str()))
            })
            .collect())
    }

    /// An event page. Ended and closed events stay viewable; drafts do not.
    #[instrument(skip(self))]
    pub async fn event_page(&self, id: EventId) -> Result<EventPage, EventError> {
        let event = self.events.fetch(id).await?;
        if event.status == EventStatus::Draft {
            return Err(EventError::NotFound(id.to_string()));
        }
        let seats = self.events.availability(id).await?;
        let on_sale = event.is_on_sale_at(self.clock.now());
        let sold_out = seats.iter().all(|s| s.available == 0);
        Ok(EventPage {
            event,
            seats,
            on_sale,
            sold_out,
        })
    }
}
