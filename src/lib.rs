//! # Box Office
//!
//! Ticketing back end for a single storefront: shoppers browse live events,
//! place orders and pay; organizers run their events, ticket types, discount
//! codes and the door.
//!
//! Every collection is owned by one [`ResourceActor`](actor_framework::ResourceActor)
//! running in its own Tokio task. The actor handles one message at a time, so
//! each collection has exactly one place where its state changes. Checkout
//! relies on that: paying for an order settles seats, sold counters and
//! revenue on the event in a single action, keyed by the order id, instead of
//! as separate writes that can interleave with another shopper's.
//!
//! ## Module Tour
//!
//! ### Resources
//! - [`model`] - plain data: events, ticket types, orders, discounts, users
//! - [`event_actor`], [`order_actor`], [`discount_actor`], [`user_actor`] -
//!   the [`ActorEntity`](actor_framework::ActorEntity) implementations
//! - [`clients`] - typed wrappers that hide message passing
//!
//! ### Services
//! - [`catalog`] - what shoppers can see
//! - [`checkout`] - placing and paying for orders
//! - [`payment`] - the gateway seam and its simulator
//! - [`organizer`] - the back office, with ownership checks
//! - [`analytics`] - dashboard aggregation
//!
//! ### Runtime
//! - [`lifecycle`] - starting, wiring and stopping everything
//! - [`config`] - `BOX_OFFICE_*` settings
//! - [`clock`] - the time source
//!
//! ## Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```

pub mod analytics;
pub mod catalog;
pub mod checkout;
pub mod clients;
pub mod clock;
pub mod config;
pub mod discount_actor;
pub mod event_actor;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod organizer;
pub mod payment;
pub mod user_actor;
