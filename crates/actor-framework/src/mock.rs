//! # Mock Clients
//!
//! `MockClient<T>` hands out a real [`ResourceClient<T>`] whose requests are
//! answered from a queue of scripted expectations instead of an actor. Code
//! that takes a client (a domain wrapper, an actor's context) can be tested
//! without the actors behind it.
//!
//! | | MockClient | Real actor |
//! |---|---|---|
//! | **State** | none, replies are scripted | real store |
//! | **Errors** | any, via `return_err` | only what the state produces |
//! | **Use for** | logic *around* a client | the actor itself, full flows |
//!
//! Expectations are consumed in order. A request that does not match the next
//! expectation (wrong kind, wrong id, or none left) panics the mock task; the
//! caller then observes [`FrameworkError::ActorDropped`] and the test fails on
//! its own assertions. Call [`MockClient::verify`] at the end of a test to make
//! sure every expectation was used.
//!
//! `Subscribe` needs no expectation: it is answered with an empty snapshot, and
//! [`MockClient::emit`] pushes changes to every such subscription.
//!
//! ```rust
//! use actor_framework::mock::MockClient;
//! use actor_framework::{ActorEntity, FrameworkError};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)] struct Hall { id: u32, seats: u32 }
//! #[derive(Debug)] struct HallCreate;
//! #[derive(Debug)] struct HallUpdate;
//! #[derive(Debug)] enum HallAction { Hold(u32) }
//! #[derive(Debug, thiserror::Error)] #[error("hall error")] struct HallError;
//!
//! #[async_trait]
//! impl ActorEntity for Hall {
//!     type Id = u32; type Create = HallCreate; type Update = HallUpdate;
//!     type Action = HallAction; type ActionResult = u32; type Context = (); type Error = HallError;
//!     fn from_create_params(id: u32, _: HallCreate) -> Result<Self, HallError> { Ok(Self { id, seats: 0 }) }
//!     async fn on_update(&mut self, _: HallUpdate, _: &()) -> Result<(), HallError> { Ok(()) }
//!     async fn handle_action(&mut self, _: HallAction, _: &()) -> Result<u32, HallError> { Ok(self.seats) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockClient::<Hall>::new();
//!     mock.expect_get(1).return_ok(Some(Hall { id: 1, seats: 300 }));
//!     mock.expect_action(1).return_err(FrameworkError::ActorClosed);
//!
//!     let client = mock.client();
//!     assert_eq!(client.get(1).await.unwrap().unwrap().seats, 300);
//!     let held = client.perform_action(1, HallAction::Hold(2)).await;
//!     assert!(matches!(held, Err(FrameworkError::ActorClosed)));
//!     mock.verify();
//! }
//! ```

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use crate::subscription::{Change, Subscription};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, mpsc, oneshot};

/// One scripted reply.
enum Expectation<T: ActorEntity> {
    Get {
        id: T::Id,
        response: Result<Option<T>, FrameworkError>,
    },
    Create {
        response: Result<T::Id, FrameworkError>,
    },
    Update {
        id: T::Id,
        response: Result<T, FrameworkError>,
    },
    Delete {
        id: T::Id,
        response: Result<(), FrameworkError>,
    },
    Action {
        id: T::Id,
        response: Result<T::ActionResult, FrameworkError>,
    },
    List {
        response: Result<Vec<T>, FrameworkError>,
    },
}

impl<T: ActorEntity> Expectation<T> {
    fn kind(&self) -> &'static str {
        match self {
            Self::Get { .. } => "get",
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::Action { .. } => "action",
            Self::List { .. } => "list",
        }
    }
}

type Queue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

fn lock<T: ActorEntity>(queue: &Queue<T>) -> MutexGuard<'_, VecDeque<Expectation<T>>> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A client whose replies are scripted.
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    changes: broadcast::Sender<Change<T>>,
    expectations: Queue<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a mock with no expectations. Must be called inside a Tokio
    /// runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let (changes, _) = broadcast::channel(64);
        let expectations: Queue<T> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();
        let subscribe_to = changes.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                if let ResourceRequest::Subscribe { respond_to } = request {
                    let _ = respond_to.send(Ok(Subscription::new(
                        Vec::new(),
                        subscribe_to.subscribe(),
                    )));
                    continue;
                }

                let expectation = lock(&queue).pop_front();
                answer(request, expectation);
            }
        });

        Self {
            client: ResourceClient::new(sender, changes.clone()),
            changes,
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    /// Broadcasts `change` to every subscription taken from this mock.
    pub fn emit(&self, change: Change<T>) {
        let _ = self.changes.send(change);
    }

    pub fn expect_get(&mut self, id: T::Id) -> ExpectationBuilder<T, Option<T>> {
        self.builder(move |response| Expectation::Get { id, response })
    }

    pub fn expect_create(&mut self) -> ExpectationBuilder<T, T::Id> {
        self.builder(|response| Expectation::Create { response })
    }

    pub fn expect_update(&mut self, id: T::Id) -> ExpectationBuilder<T, T> {
        self.builder(move |response| Expectation::Update { id, response })
    }

    pub fn expect_delete(&mut self, id: T::Id) -> ExpectationBuilder<T, ()> {
        self.builder(move |response| Expectation::Delete { id, response })
    }

    pub fn expect_action(&mut self, id: T::Id) -> ExpectationBuilder<T, T::ActionResult> {
        self.builder(move |response| Expectation::Action { id, response })
    }

    /// Expects a `list`. The filter is not evaluated; the scripted items are
    /// returned as they are.
    pub fn expect_list(&mut self) -> ExpectationBuilder<T, Vec<T>> {
        self.builder(|response| Expectation::List { response })
    }

    /// Panics unless every expectation was consumed.
    pub fn verify(&self) {
        let remaining: Vec<&'static str> = lock(&self.expectations)
            .iter()
            .map(Expectation::kind)
            .collect();
        if !remaining.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining: {:?}",
                remaining.len(),
                remaining
            );
        }
    }

    fn builder<R: 'static>(
        &self,
        make: impl FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send + 'static,
    ) -> ExpectationBuilder<T, R> {
        ExpectationBuilder {
            make: Box::new(make),
            expectations: self.expectations.clone(),
        }
    }
}

fn answer<T: ActorEntity>(request: ResourceRequest<T>, expectation: Option<Expectation<T>>) {
    fn reply<R>(
        respond_to: oneshot::Sender<Result<R, FrameworkError>>,
        response: Result<R, FrameworkError>,
    ) {
        let _ = respond_to.send(response);
    }

    match (request, expectation) {
        (ResourceRequest::Get { id, respond_to }, Some(Expectation::Get { id: want, response })) => {
            assert_eq!(id, want, "get for an unexpected id");
            reply(respond_to, response);
        }
        (ResourceRequest::Create { respond_to, .. }, Some(Expectation::Create { response })) => {
            reply(respond_to, response);
        }
        (
            ResourceRequest::Update { id, respond_to, .. },
            Some(Expectation::Update { id: want, response }),
        ) => {
            assert_eq!(id, want, "update for an unexpected id");
            reply(respond_to, response);
        }
        (
            ResourceRequest::Delete { id, respond_to },
            Some(Expectation::Delete { id: want, response }),
        ) => {
            assert_eq!(id, want, "delete for an unexpected id");
            reply(respond_to, response);
        }
        (
            ResourceRequest::Action { id, respond_to, .. },
            Some(Expectation::Action { id: want, response }),
        ) => {
            assert_eq!(id, want, "action for an unexpected id");
            reply(respond_to, response);
        }
        (ResourceRequest::List { respond_to, .. }, Some(Expectation::List { response })) => {
            reply(respond_to, response);
        }
        (request, Some(expectation)) => panic!(
            "Expected a {} request, got {:?}",
            expectation.kind(),
            request
        ),
        (request, None) => panic!("Unexpected request: {:?}", request),
    }
}

/// Completes an expectation with the reply to give.
pub struct ExpectationBuilder<T: ActorEntity, R> {
    make: Box<dyn FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send>,
    expectations: Queue<T>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    pub fn return_ok(self, value: R) {
        lock(&self.expectations).push_back((self.make)(Ok(value)));
    }

    pub fn return_err(self, error: FrameworkError) {
        lock(&self.expectations).push_back((self.make)(Err(error)));
    }
}

/// A client paired with the raw request receiver, for tests that need to look
/// at the payload a caller sent.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    let (changes, _) = broadcast::channel(buffer_size.max(1));
    (ResourceClient::new(sender, changes), receiver)
}

/// Next request, if it is a Create.
pub async fn expect_create<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Create, oneshot::Sender<Result<T::Id, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Next request, if it is an Action.
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    T::Id,
    T::Action,
    oneshot::Sender<Result<T::ActionResult, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}
