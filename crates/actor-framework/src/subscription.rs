//! # Change Stream
//!
//! Each `ResourceActor` broadcasts every committed mutation. A [`Subscription`]
//! is obtained through the actor itself, so the snapshot it carries and the
//! first change it yields are consistent: nothing committed in between is lost
//! or seen twice.
//!
//! Teardown is scoped: dropping the `Subscription` drops its receiver, and the
//! actor stops buffering for it.

use crate::entity::ActorEntity;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

/// One committed mutation.
#[derive(Debug, Clone)]
pub enum Change<T: ActorEntity> {
    /// The entity was created or changed; carries its new state.
    Upserted(T),
    /// The entity was removed.
    Deleted(T::Id),
    /// The subscriber fell behind and `missed` changes were discarded.
    /// Holders of derived state should resubscribe for a fresh snapshot.
    Lagged { missed: u64 },
}

/// A live view on one actor's store.
pub struct Subscription<T: ActorEntity> {
    snapshot: Vec<T>,
    receiver: broadcast::Receiver<Change<T>>,
}

impl<T: ActorEntity> Subscription<T> {
    pub(crate) fn new(snapshot: Vec<T>, receiver: broadcast::Receiver<Change<T>>) -> Self {
        Self { snapshot, receiver }
    }

    /// Every entity stored when the subscription was taken, ascending by id.
    pub fn snapshot(&self) -> &[T] {
        &self.snapshot
    }

    /// Move the snapshot out, leaving it empty.
    pub fn take_snapshot(&mut self) -> Vec<T> {
        std::mem::take(&mut self.snapshot)
    }

    /// Wait for the next change. `None` once the actor has shut down.
    pub async fn next(&mut self) -> Option<Change<T>> {
        match self.receiver.recv().await {
            Ok(change) => Some(change),
            Err(RecvError::Lagged(missed)) => {
                warn!(missed, "Subscriber lagged");
                Some(Change::Lagged { missed })
            }
            Err(RecvError::Closed) => None,
        }
    }
}
