//! # Generic Actor Server
//!
//! `ResourceActor` owns one collection and answers requests for it strictly one
//! at a time. That sequential loop is the only serialization point a
//! collection needs: a check followed by a write inside one request cannot be
//! interleaved with another request.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::{Filter, ResourceRequest};
use crate::subscription::{Change, Subscription};
use std::collections::BTreeMap;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

const MIN_CHANGE_BUFFER: usize = 16;

/// The generic actor that manages a collection of entities.
///
/// # Operations
///
/// * **Create**: allocates the next id, builds the entity with
///   `from_create_params`, runs `on_create`, enforces the unique key, stores
///   it. The id is consumed even when creation fails, so ids are never reused.
/// * **Get** / **List**: clone out of the store, ascending by id.
/// * **Update** / **Action**: run the hook on a copy, commit the copy only on
///   `Ok`.
/// * **Delete**: `on_delete` may veto; otherwise the entity is removed.
/// * **Subscribe**: snapshot plus change receiver, taken atomically.
///
/// ```rust
/// use actor_framework::{ActorEntity, ResourceActor};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Seat { id: u32, taken: bool }
/// #[derive(Debug)] struct SeatCreate;
/// #[derive(Debug)] struct SeatUpdate;
/// #[derive(Debug)] enum SeatAction { Take }
/// #[derive(Debug, thiserror::Error)] #[error("seat already taken")] struct SeatError;
///
/// #[async_trait]
/// impl ActorEntity for Seat {
///     type Id = u32; type Create = SeatCreate; type Update = SeatUpdate;
///     type Action = SeatAction; type ActionResult = (); type Context = (); type Error = SeatError;
///     fn from_create_params(id: u32, _: SeatCreate) -> Result<Self, SeatError> { Ok(Self { id, taken: false }) }
///     async fn on_update(&mut self, _: SeatUpdate, _: &()) -> Result<(), SeatError> { Ok(()) }
///     async fn handle_action(&mut self, _: SeatAction, _: &()) -> Result<(), SeatError> {
///         if self.taken { return Err(SeatError); }
///         self.taken = true;
///         Ok(())
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = ResourceActor::<Seat>::new(8);
///     tokio::spawn(actor.run(()));
///     let id = client.create(SeatCreate).await.unwrap();
///     assert!(client.perform_action(id, SeatAction::Take).await.is_ok());
///     assert!(client.perform_action(id, SeatAction::Take).await.is_err());
/// }
/// ```
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: BTreeMap<T::Id, T>,
    changes: broadcast::Sender<Change<T>>,
    next_id: u32,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates the actor and its client.
    ///
    /// `buffer_size` bounds the request channel; a full channel makes callers
    /// wait. The change stream buffers at least 16 changes per subscriber.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (changes, _) = broadcast::channel(buffer_size.max(MIN_CHANGE_BUFFER));
        let client = ResourceClient::new(sender, changes.clone());
        let actor = Self {
            receiver,
            store: BTreeMap::new(),
            changes,
            next_id: 1,
        };
        (actor, client)
    }

    /// Runs the event loop until every client has been dropped.
    ///
    /// `context` is handed to every hook; it usually holds the clients of the
    /// actors this one depends on.
    pub async fn run(mut self, context: T::Context) {
        // "Event" instead of "box_office::model::event::Event"
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let result = self.create(params, &context, entity_type).await;
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    debug!(entity_type, %id, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    let result = self.update(id, update, &context, entity_type).await;
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let result = self.delete(id, &context, entity_type).await;
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    let result = self.action(id, action, &context, entity_type).await;
                    let _ = respond_to.send(result);
                }
                ResourceRequest::List { filter, respond_to } => {
                    let items = self.list(&filter);
                    debug!(entity_type, matched = items.len(), "List");
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Subscribe { respond_to } => {
                    let snapshot: Vec<T> = self.store.values().cloned().collect();
                    let subscription = Subscription::new(snapshot, self.changes.subscribe());
                    debug!(
                        entity_type,
                        subscribers = self.changes.receiver_count(),
                        "Subscribe"
                    );
                    let _ = respond_to.send(Ok(subscription));
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }

    async fn create(
        &mut self,
        params: T::Create,
        context: &T::Context,
        entity_type: &str,
    ) -> Result<T::Id, FrameworkError> {
        debug!(entity_type, ?params, "Create");
        let id = T::Id::from(self.next_id);
        self.next_id += 1;

        let mut item = T::from_create_params(id.clone(), params).map_err(|e| {
            warn!(entity_type, error = %e, "Create rejected");
            FrameworkError::EntityError(Box::new(e))
        })?;
        if let Err(e) = item.on_create(context).await {
            warn!(entity_type, %id, error = %e, "on_create failed");
            return Err(FrameworkError::EntityError(Box::new(e)));
        }
        self.ensure_unique(&item, None, entity_type)?;

        self.store.insert(id.clone(), item.clone());
        info!(entity_type, %id, size = self.store.len(), "Created");
        self.publish(Change::Upserted(item));
        Ok(id)
    }

    async fn update(
        &mut self,
        id: T::Id,
        update: T::Update,
        context: &T::Context,
        entity_type: &str,
    ) -> Result<T, FrameworkError> {
        debug!(entity_type, %id, ?update, "Update");
        let mut draft = self.draft(&id, entity_type)?;
        if let Err(e) = draft.on_update(update, context).await {
            warn!(entity_type, %id, error = %e, "Update failed");
            return Err(FrameworkError::EntityError(Box::new(e)));
        }
        self.ensure_unique(&draft, Some(&id), entity_type)?;
        self.commit(id.clone(), draft.clone());
        info!(entity_type, %id, "Updated");
        Ok(draft)
    }

    async fn delete(
        &mut self,
        id: T::Id,
        context: &T::Context,
        entity_type: &str,
    ) -> Result<(), FrameworkError> {
        debug!(entity_type, %id, "Delete");
        let Some(item) = self.store.get(&id) else {
            warn!(entity_type, %id, "Not found");
            return Err(FrameworkError::NotFound(id.to_string()));
        };
        if let Err(e) = item.on_delete(context).await {
            warn!(entity_type, %id, error = %e, "on_delete failed");
            return Err(FrameworkError::EntityError(Box::new(e)));
        }
        self.store.remove(&id);
        info!(entity_type, %id, size = self.store.len(), "Deleted");
        self.publish(Change::Deleted(id));
        Ok(())
    }

    async fn action(
        &mut self,
        id: T::Id,
        action: T::Action,
        context: &T::Context,
        entity_type: &str,
    ) -> Result<T::ActionResult, FrameworkError> {
        debug!(entity_type, %id, ?action, "Action");
        let mutates = T::action_mutates(&action);
        let mut draft = self.draft(&id, entity_type)?;
        match draft.handle_action(action, context).await {
            Ok(result) => {
                if mutates {
                    self.ensure_unique(&draft, Some(&id), entity_type)?;
                    self.commit(id.clone(), draft);
                }
                info!(entity_type, %id, "Action ok");
                Ok(result)
            }
            Err(e) => {
                warn!(entity_type, %id, error = %e, "Action failed");
                Err(FrameworkError::EntityError(Box::new(e)))
            }
        }
    }

    fn list(&self, filter: &Filter<T>) -> Vec<T> {
        self.store
            .values()
            .filter(|item| filter(item))
            .cloned()
            .collect()
    }

    fn draft(&self, id: &T::Id, entity_type: &str) -> Result<T, FrameworkError> {
        self.store.get(id).cloned().ok_or_else(|| {
            warn!(entity_type, %id, "Not found");
            FrameworkError::NotFound(id.to_string())
        })
    }

    fn commit(&mut self, id: T::Id, item: T) {
        self.store.insert(id, item.clone());
        self.publish(Change::Upserted(item));
    }

    fn ensure_unique(
        &self,
        item: &T,
        except: Option<&T::Id>,
        entity_type: &str,
    ) -> Result<(), FrameworkError> {
        let Some(key) = item.unique_key() else {
            return Ok(());
        };
        let taken = self.store.iter().any(|(other_id, other)| {
            Some(other_id) != except && other.unique_key().as_deref() == Some(key.as_str())
        });
        if taken {
            warn!(entity_type, %key, "Unique key conflict");
            return Err(FrameworkError::Conflict(key));
        }
        Ok(())
    }

    fn publish(&self, change: Change<T>) {
        // No subscribers is the common case; the send error only means that.
        let _ = self.changes.send(change);
    }
}
