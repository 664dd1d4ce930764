//! # User Actor
//!
//! Profiles only: the external auth provider owns credentials and sessions.
//! No dependencies (`Context = ()`).

pub mod entity;
pub mod error;

pub use entity::UserAction;
pub use error::*;

use crate::clients::UserClient;
use crate::model::User;
use actor_framework::ResourceActor;

/// Creates a new User actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<User>, UserClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, UserClient::new(generic_client))
}
