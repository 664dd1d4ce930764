//! Error types for the Discount actor.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DiscountError {
    #[error("Discount not found: {0}")]
    NotFound(String),

    #[error("Invalid discount: {0}")]
    Validation(String),

    /// The organizer already has a code with this name.
    #[error("Discount code already exists: {0}")]
    DuplicateCode(String),

    #[error("Unknown discount code: {0}")]
    UnknownCode(String),

    #[error("Discount code {code} has reached its usage limit of {limit}")]
    Exhausted { code: String, limit: u32 },

    #[error("Discount service unavailable: {0}")]
    Unavailable(String),
}

impl DiscountError {
    pub fn is_transient(&self) -> bool {
        matches!(self, DiscountError::Unavailable(_))
    }
}

impl actor_framework::Transient for DiscountError {
    fn is_transient(&self) -> bool {
        DiscountError::is_transient(self)
    }
}
