//! [`ActorEntity`] implementation for [`User`].
//!
//! E-mail addresses are stored lower-cased and double as the unique key, so a
//! second registration with the same address (in any case) is rejected by the
//! actor.

use super::error::UserError;
use crate::model::{ProfileUpdate, Role, User, UserCreate, UserId};
use actor_framework::ActorEntity;
use async_trait::async_trait;

/// Profile changes beyond plain field edits.
#[derive(Debug, Clone)]
pub enum UserAction {
    /// Switch to the organizer role, recording the organization name.
    BecomeOrganizer { organization: String },
}

#[async_trait]
impl ActorEntity for User {
    type Id = UserId;
    type Create = UserCreate;
    type Update = ProfileUpdate;
    type Action = UserAction;
    type ActionResult = User;
    type Context = ();
    type Error = UserError;

    fn from_create_params(id: UserId, params: UserCreate) -> Result<Self, UserError> {
        Ok(Self {
            id,
            name: validate_name(&params.name)?,
            email: validate_email(&params.email)?,
            phone: non_empty(params.phone),
            organization: None,
            photo_url: None,
            role: Role::Attendee,
            created_at: params.created_at,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.clone())
    }

    async fn on_update(&mut self, update: ProfileUpdate, _ctx: &()) -> Result<(), UserError> {
        if let Some(name) = update.name {
            self.name = validate_name(&name)?;
        }
        if update.phone.is_some() {
            self.phone = non_empty(update.phone);
        }
        if update.organization.is_some() {
            self.organization = non_empty(update.organization);
        }
        if update.photo_url.is_some() {
            self.photo_url = non_empty(update.photo_url);
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: UserAction, _ctx: &()) -> Result<User, UserError> {
        match action {
            UserAction::BecomeOrganizer { organization } => {
                let organization = organization.trim();
                if organization.is_empty() {
                    return Err(UserError::Validation(
                        "organization name is required".into(),
                    ));
                }
                self.organization = Some(organization.to_string());
                self.role = Role::Organizer;
                Ok(self.clone())
            }
        }
    }
}

fn validate_name(name: &str) -> Result<String, UserError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(UserError::Validation("name is required".into()));
    }
    Ok(name.to_string())
}

fn validate_email(email: &str) -> Result<String, UserError> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
        }
        None => false,
    };
    if !valid {
        return Err(UserError::Validation(format!("invalid e-mail {email:?}")));
    }
    Ok(email)
}

/// Blank strings are stored as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
