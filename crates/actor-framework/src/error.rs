//! # Framework Errors
//!
//! Errors raised by the plumbing rather than by an entity. Entity errors travel
//! boxed inside [`FrameworkError::EntityError`] and can be recovered with
//! [`FrameworkError::downcast_entity`].

/// Errors that can occur within the actor framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unique key already taken: {0}")]
    Conflict(String),
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}

impl FrameworkError {
    /// True when the request never reached a decision: the actor was gone or
    /// dropped the reply. Retrying such a request is safe only if the
    /// operation is idempotent.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ActorClosed | Self::ActorDropped)
    }

    /// Recover the concrete entity error, or give back `self` unchanged.
    pub fn downcast_entity<E>(self) -> Result<E, Self>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Self::EntityError(inner) => inner
                .downcast::<E>()
                .map(|boxed| *boxed)
                .map_err(Self::EntityError),
            other => Err(other),
        }
    }
}
