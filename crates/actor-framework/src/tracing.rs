//! # Log Setup
//!
//! Structured logging for every actor. The actor loop records `entity_type`
//! and the entity `id` as fields, so the module path is hidden
//! (`with_target(false)`) and lines stay short.
//!
//! ```bash
//! RUST_LOG=info cargo run          # lifecycle and committed writes
//! RUST_LOG=debug cargo run         # every request with its payload
//! RUST_LOG=box_office=debug,actor_framework=info cargo run
//! ```
//!
//! With `RUST_LOG=info` a checkout reads like:
//!
//! ```text
//! INFO Created entity_type="Order" id=order_1 size=1
//! INFO pay:confirm_payment: Action ok entity_type="Event" id=event_1
//! INFO pay:confirm_payment: Action ok entity_type="Order" id=order_1
//! ```

use tracing_subscriber::EnvFilter;

/// Installs the compact formatter filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once: later calls leave the first subscriber in
/// place, which keeps tests that each call it from panicking.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}
