//! # Domain Model
//!
//! Plain data: events with their ticket types, orders, discount codes and user
//! profiles. Behavior that needs no actor (status tables, availability,
//! discount arithmetic) lives here as methods; everything that changes state
//! goes through the actor modules.
//!
//! Ids are `u32` newtypes allocated by the owning actor and displayed with a
//! prefix (`event_7`, `order_3`).

pub mod discount;
pub mod event;
pub mod order;
pub mod user;

pub use discount::*;
pub use event::*;
pub use order::*;
pub use user::*;

macro_rules! resource_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        pub struct $name(pub u32);

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "_{}"), self.0)
            }
        }
    };
}

resource_id!(
    /// Identifies an [`Event`].
    EventId,
    "event"
);
resource_id!(
    /// Identifies a [`TicketType`] within its event.
    TicketTypeId,
    "ticket"
);
resource_id!(
    /// Identifies an [`Order`].
    OrderId,
    "order"
);
resource_id!(
    /// Identifies a [`Discount`] code.
    DiscountId,
    "discount"
);
resource_id!(
    /// Identifies a [`User`] profile.
    UserId,
    "user"
);
