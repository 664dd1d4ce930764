//! # Order Actor
//!
//! Owns every [`Order`]. This is the only actor with dependencies: its
//! context carries the [`EventClient`](crate::clients::EventClient) and the
//! [`DiscountClient`](crate::clients::DiscountClient).
//!
//! - [`entity`] - [`ActorEntity`](actor_framework::ActorEntity) implementation for [`Order`]
//! - [`error`] - [`OrderError`]
//! - [`actions`] - [`OrderAction`] and [`OrderActionResult`]
//!
//! ## Payment confirmation
//!
//! `ConfirmPayment` settles the order on the event and flips it to `Paid` in
//! the same hook. The event records the settlement under the order id, so a
//! confirmation retried after a lost reply settles nothing twice, and the
//! order actor serializes two confirmations of one order.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use entity::OrderContext;
pub use error::*;

use crate::clients::OrderClient;
use crate::model::Order;
use actor_framework::ResourceActor;

/// Creates a new Order actor and its client.
///
/// Spawn it with `actor.run((events, discounts))`.
pub fn new(buffer_size: usize) -> (ResourceActor<Order>, OrderClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, OrderClient::new(generic_client))
}
