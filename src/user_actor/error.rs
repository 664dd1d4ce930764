//! Error types for the User actor.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Invalid profile: {0}")]
    Validation(String),

    #[error("E-mail already registered: {0}")]
    EmailTaken(String),

    #[error("User service unavailable: {0}")]
    Unavailable(String),
}

impl UserError {
    pub fn is_transient(&self) -> bool {
        matches!(self, UserError::Unavailable(_))
    }
}
