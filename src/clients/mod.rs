//! Typed wrappers around [`ResourceClient`](actor_framework::ResourceClient).
//!
//! Each client maps [`FrameworkError`](actor_framework::FrameworkError) into
//! its resource's error enum. Entity errors are downcast, so a caller sees
//! the exact variant the actor rejected with.

pub mod discount_client;
pub mod event_client;
pub mod order_client;
pub mod user_client;

pub use discount_client::*;
pub use event_client::*;
pub use order_client::*;
pub use user_client::*;
