//! # ActorEntity Trait
//!
//! The contract a stored resource (an event, an order, a discount code, a
//! profile) implements so a [`ResourceActor`](crate::ResourceActor) can own it.
//! Associated types pin down the id, the create/update payloads, the custom
//! actions and their results, the injected context, and the error type.
//!
//! # Commit-on-success
//!
//! `on_update` and `handle_action` receive `&mut self`, but the actor hands
//! them a *copy* of the stored entity. The copy replaces the stored value only
//! when the hook returns `Ok`. A hook may therefore mutate freely and bail out
//! halfway with `?`; nothing it touched survives the error.
//!
//! # Unique keys
//!
//! [`ActorEntity::unique_key`] lets an entity declare a secondary key (an
//! e-mail address, a discount code) that must be unique across the store. The
//! actor checks it on create and on every committed mutation.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any resource entity must implement to be managed by `ResourceActor`.
///
/// # Async & Context
/// Hooks are `#[async_trait]` so they can call other actors. The `Context` is
/// injected once through `run()`, which lets actors be constructed before
/// their dependencies exist ("late binding").
#[async_trait]
pub trait ActorEntity: Clone + Debug + Send + Sync + 'static {
    /// The unique identifier. Allocated by the actor from a `u32` sequence,
    /// ordered so listings come back in creation order.
    type Id: Eq + Ord + Hash + Clone + Send + Sync + Display + Debug + From<u32>;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Resource-specific operations (e.g. settling an order against inventory).
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// One error enum per resource, shared by every hook.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the entity from the allocated id and the create payload.
    /// Runs synchronously, before `on_create`, so it is the place for checks
    /// that must reject a request before any other actor is contacted.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Secondary key that must be unique across the store.
    fn unique_key(&self) -> Option<String> {
        None
    }

    /// Whether `action` can change the entity. Read-only actions are never
    /// committed or broadcast.
    fn action_mutates(_action: &Self::Action) -> bool {
        true
    }

    // --- Lifecycle Hooks (Async) ---

    /// Called after `from_create_params` and before the entity is stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Apply an update payload.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Called immediately before the entity is removed. Returning an error
    /// vetoes the delete.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Handle a custom resource-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
