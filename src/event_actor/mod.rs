//! # Event Actor
//!
//! Owns every [`Event`] together with its ticket types and settlement ledger.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](actor_framework::ActorEntity) implementation for [`Event`]
//! - [`error`] - [`EventError`]
//! - [`actions`] - [`EventAction`] and [`EventActionResult`]
//! - [`new()`] - Factory function that creates the actor and client
//!
//! ## Inventory
//!
//! `quantity_sold <= quantity_total` holds for every ticket type at every
//! commit. Pricing ([`EventAction::Quote`]) only reads; seats are taken by
//! [`EventAction::Settle`], which checks all lines of an order first and then
//! moves the ticket counters, `tickets_sold` and `revenue` together. The
//! ledger entry it writes under the order id turns a repeated settle into a
//! no-op and lets [`EventAction::Release`] undo it exactly once.
//!
//! ```rust
//! use box_office::event_actor;
//! use box_office::model::{EventCreate, TicketTypeDraft, UserId};
//! use chrono::{Duration, Utc};
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (actor, events) = event_actor::new(8);
//!     tokio::spawn(actor.run(()));
//!
//!     let now = Utc::now();
//!     let id = events
//!         .create_event(EventCreate {
//!             organizer_id: UserId(1),
//!             title: "Poetry Slam".into(),
//!             description: String::new(),
//!             images: vec![],
//!             location: "Abuja".into(),
//!             is_online: false,
//!             start: now + Duration::days(7),
//!             end: None,
//!             ticket_types: vec![TicketTypeDraft::paid("Entry", Decimal::from(15), "NGN", 50)],
//!             publish: true,
//!             created_at: now,
//!         })
//!         .await?;
//!
//!     let seats = events.availability(id).await?;
//!     assert_eq!(seats[0].available, 50);
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::EventClient;
use crate::model::Event;
use actor_framework::ResourceActor;

/// Creates a new Event actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Event>, EventClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, EventClient::new(generic_client))
}
