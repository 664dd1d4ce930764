//! # Discount Actor
//!
//! Owns every [`Discount`] code. A code is unique per organizer (enforced by
//! the actor through [`ActorEntity::unique_key`](actor_framework::ActorEntity::unique_key))
//! and is redeemed once per order up to its usage limit.
//!
//! - [`entity`] - [`ActorEntity`](actor_framework::ActorEntity) implementation for [`Discount`]
//! - [`error`] - [`DiscountError`]
//! - [`actions`] - [`DiscountAction`] and [`DiscountActionResult`]

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::DiscountClient;
use crate::model::Discount;
use actor_framework::ResourceActor;

/// Creates a new Discount actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Discount>, DiscountClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, DiscountClient::new(generic_client))
}
