//! # System Lifecycle
//!
//! [`BoxOffice`] starts the four actors, wires the order actor's context and
//! builds the services on top of the clients.
//!
//! ## Wiring
//!
//! ```text
//! user    (Context = ())
//! event   (Context = ())
//! discount(Context = ())
//! order   (Context = (EventClient, DiscountClient))
//! ```
//!
//! The graph is acyclic: nothing depends on the order actor. An order hook
//! can therefore await the event actor without ever waiting on itself.
//!
//! ## Shutdown
//!
//! 1. Signal the [`StatusSweeper`] through its watch channel and await it
//! 2. Drop every client held here, closing the actors' channels
//! 3. Await the order actor, whose exit drops the last event and discount
//!    clients, then the rest
//!
//! All of it is bounded by `Config::shutdown_timeout`.

mod box_office;
pub mod sweeper;

pub use box_office::{BoxOffice, SystemError};
pub use sweeper::StatusSweeper;
