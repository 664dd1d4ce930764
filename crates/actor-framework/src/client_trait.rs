//! # ActorClient Trait
//!
//! Common surface for resource-specific clients: `get`, `delete`, `list` and
//! `subscribe` come for free on top of a generic `ResourceClient`.
use crate::{ActorEntity, FrameworkError, ResourceClient, Subscription};
use async_trait::async_trait;

/// Trait for resource-specific clients to inherit the standard reads.
///
/// # Example
///
/// ```rust
/// use actor_framework::{ActorClient, ActorEntity, FrameworkError, ResourceClient};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)]
/// struct Venue { id: u32 }
/// #[derive(Debug)] struct VenueCreate;
/// #[derive(Debug)] struct VenueUpdate;
/// #[derive(Debug)] enum VenueAction {}
///
/// #[derive(Debug, thiserror::Error)]
/// enum VenueError {
///     #[error("venue unavailable: {0}")]
///     Unavailable(String),
/// }
///
/// #[async_trait]
/// impl ActorEntity for Venue {
///     type Id = u32;
///     type Create = VenueCreate;
///     type Update = VenueUpdate;
///     type Action = VenueAction;
///     type ActionResult = ();
///     type Context = ();
///     type Error = VenueError;
///
///     fn from_create_params(id: u32, _: VenueCreate) -> Result<Self, Self::Error> {
///         Ok(Self { id })
///     }
///     async fn on_update(&mut self, _: VenueUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
///     async fn handle_action(&mut self, _: VenueAction, _: &()) -> Result<(), Self::Error> { Ok(()) }
/// }
///
/// struct VenueClient {
///     inner: ResourceClient<Venue>,
/// }
///
/// impl ActorClient<Venue> for VenueClient {
///     type Error = VenueError;
///
///     fn inner(&self) -> &ResourceClient<Venue> {
///         &self.inner
///     }
///
///     fn map_error(e: FrameworkError) -> Self::Error {
///         VenueError::Unavailable(e.to_string())
///     }
/// }
///
/// async fn usage(client: VenueClient) {
///     let _ = client.get(1).await;
///     let _ = client.list(|v: &Venue| v.id > 3).await;
///     let _ = client.delete(1).await;
/// }
/// ```
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    /// The resource-specific error type.
    type Error: Send + Sync;

    /// Access the inner generic ResourceClient.
    fn inner(&self) -> &ResourceClient<T>;

    /// Map framework errors to the specific resource error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch an entity by ID.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Delete an entity by ID.
    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: T::Id) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner().delete(id).await.map_err(Self::map_error)
    }

    /// Every entity matching `filter`, ascending by id.
    async fn list<F>(&self, filter: F) -> Result<Vec<T>, Self::Error>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.inner().list(filter).await.map_err(Self::map_error)
    }

    /// Snapshot plus live changes.
    async fn subscribe(&self) -> Result<Subscription<T>, Self::Error> {
        self.inner().subscribe().await.map_err(Self::map_error)
    }
}
