//! # Actor Framework
//!
//! Building blocks for type-safe actor systems on Tokio, arranged as a
//! **resource-oriented** API: every collection of entities (events, orders,
//! discount codes) is owned by one actor and reached through the same handful
//! of operations.
//!
//! ## Why one actor per collection?
//!
//! - **Isolated state**: the store lives inside the actor task. No locks, no
//!   shared memory.
//! - **One serialization point**: requests are processed one at a time, so a
//!   read-check-write inside a single request is atomic with respect to every
//!   other caller. "Sell the last seat" needs nothing more.
//! - **Coordination by message**: when one resource needs another (an order
//!   settling against its event) it sends an `Action` to that actor rather than
//!   touching its state.
//!
//! **Further Reading**:
//! - [Actor Model (Wikipedia)](https://en.wikipedia.org/wiki/Actor_model)
//! - [Actors with Tokio](https://ryhl.io/blog/actors-with-tokio/)
//!
//! ## Layers
//!
//! 1. **Entity** ([`ActorEntity`]): the business rules of one resource.
//! 2. **Runtime** ([`ResourceActor`]): the message loop, the store, the change
//!    stream.
//! 3. **Interface** ([`ResourceClient`], [`ActorClient`]): typed async calls.
//!
//! ```rust
//! use actor_framework::{ActorEntity, Change, ResourceActor};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)]
//! struct Room { id: u32, name: String, booked: bool }
//!
//! #[derive(Debug)] struct RoomCreate { name: String }
//! #[derive(Debug)] struct RoomUpdate { name: Option<String> }
//! #[derive(Debug)] enum RoomAction { Book }
//!
//! #[derive(Debug, thiserror::Error)]
//! enum RoomError {
//!     #[error("room already booked")]
//!     AlreadyBooked,
//! }
//!
//! #[async_trait]
//! impl ActorEntity for Room {
//!     type Id = u32;
//!     type Create = RoomCreate;
//!     type Update = RoomUpdate;
//!     type Action = RoomAction;
//!     type ActionResult = ();
//!     type Context = ();
//!     type Error = RoomError;
//!
//!     fn from_create_params(id: u32, params: RoomCreate) -> Result<Self, RoomError> {
//!         Ok(Self { id, name: params.name, booked: false })
//!     }
//!
//!     async fn on_update(&mut self, update: RoomUpdate, _: &()) -> Result<(), RoomError> {
//!         if let Some(name) = update.name { self.name = name; }
//!         Ok(())
//!     }
//!
//!     async fn handle_action(&mut self, action: RoomAction, _: &()) -> Result<(), RoomError> {
//!         match action {
//!             RoomAction::Book if self.booked => Err(RoomError::AlreadyBooked),
//!             RoomAction::Book => { self.booked = true; Ok(()) }
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = ResourceActor::<Room>::new(10);
//!     tokio::spawn(actor.run(()));
//!
//!     let mut changes = client.subscribe().await.unwrap();
//!     let id = client.create(RoomCreate { name: "Main hall".into() }).await.unwrap();
//!     client.perform_action(id, RoomAction::Book).await.unwrap();
//!
//!     assert!(matches!(changes.next().await, Some(Change::Upserted(r)) if !r.booked));
//!     assert!(matches!(changes.next().await, Some(Change::Upserted(r)) if r.booked));
//! }
//! ```
//!
//! ## Context Injection
//!
//! Dependencies arrive through `run(context)`, not the constructor. All actors
//! can be created first and wired afterwards:
//!
//! ```rust,ignore
//! let (event_actor, event_client) = ResourceActor::<Event>::new(32);
//! let (order_actor, order_client) = ResourceActor::<Order>::new(32);
//! tokio::spawn(event_actor.run(()));
//! tokio::spawn(order_actor.run((event_client.clone(), discount_client.clone())));
//! ```
//!
//! Keep the dependency graph acyclic. An actor awaiting a call to an actor that
//! is in turn awaiting it would never wake.
//!
//! ## Testing
//!
//! [`mock::MockClient`] answers a real `ResourceClient` from scripted
//! expectations, so an actor whose context holds clients can be tested without
//! the actors behind them.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod retry;
pub mod subscription;
pub mod tracing;

// Re-export core types for convenience
pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{Filter, ResourceRequest, Response};
pub use retry::{retry_transient, RetryPolicy, Transient};
pub use subscription::{Change, Subscription};
