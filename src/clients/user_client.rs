//! # User Client

use crate::model::{ProfileUpdate, User, UserCreate, UserId};
use crate::user_actor::{UserAction, UserError};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the User actor.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
}

impl UserClient {
    pub fn new(inner: ResourceClient<User>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<User> for UserClient {
    type Error = UserError;

    fn inner(&self) -> &ResourceClient<User> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.downcast_entity::<UserError>() {
            Ok(err) => err,
            Err(FrameworkError::NotFound(id)) => UserError::NotFound(id),
            Err(FrameworkError::Conflict(email)) => UserError::EmailTaken(email),
            Err(other) => UserError::Unavailable(other.to_string()),
        }
    }
}

impl UserClient {
    #[instrument(skip(self, params), fields(email = %params.email))]
    pub async fn register(&self, params: UserCreate) -> Result<UserId, UserError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self, id: UserId) -> Result<User, UserError> {
        self.get(id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn update_profile(&self, id: UserId, update: ProfileUpdate) -> Result<User, UserError> {
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn become_organizer(&self, id: UserId, organization: &str) -> Result<User, UserError> {
        self.inner
            .perform_action(
                id,
                UserAction::BecomeOrganizer {
                    organization: organization.to_string(),
                },
            )
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let email = email.trim().to_lowercase();
        let found = self
            .inner
            .list(move |u: &User| u.email == email)
            .await
            .map_err(Self::map_error)?;
        Ok(found.into_iter().next())
    }
}
