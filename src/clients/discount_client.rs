//! # Discount Client
//!
//! Codes are looked up by `(organizer, code)`; the actor itself only knows
//! ids, so redemption is a list followed by an action.

use crate::discount_actor::{DiscountAction, DiscountActionResult, DiscountError, Redemption};
use crate::model::{Discount, DiscountCreate, DiscountId, OrderId, UserId};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

/// Client for interacting with the Discount actor.
#[derive(Clone)]
pub struct DiscountClient {
    inner: ResourceClient<Discount>,
}

impl DiscountClient {
    pub fn new(inner: ResourceClient<Discount>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Discount> for DiscountClient {
    type Error = DiscountError;

    fn inner(&self) -> &ResourceClient<Discount> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.downcast_entity::<DiscountError>() {
            Ok(err) => err,
            Err(FrameworkError::NotFound(id)) => DiscountError::NotFound(id),
            Err(FrameworkError::Conflict(key)) => DiscountError::DuplicateCode(key),
            Err(other) => DiscountError::Unavailable(other.to_string()),
        }
    }
}

impl DiscountClient {
    #[instrument(skip(self, params), fields(code = %params.code))]
    pub async fn create_discount(&self, params: DiscountCreate) -> Result<DiscountId, DiscountError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    /// The organizer's discount with this code, matched case-insensitively.
    #[instrument(skip(self))]
    pub async fn find_code(
        &self,
        organizer_id: UserId,
        code: &str,
    ) -> Result<Option<Discount>, DiscountError> {
        let code = Discount::normalize_code(code);
        let found = self
            .inner
            .list(move |d: &Discount| d.organizer_id == organizer_id && d.code == code)
            .await
            .map_err(Self::map_error)?;
        Ok(found.into_iter().next())
    }

    /// Redeem `code` for `order_id`. Unknown codes are an error rather than
    /// a silent zero discount.
    #[instrument(skip(self))]
    pub async fn redeem_code(
        &self,
        organizer_id: UserId,
        code: &str,
        order_id: OrderId,
        subtotal: Decimal,
    ) -> Result<Redemption, DiscountError> {
        let discount = self
            .find_code(organizer_id, code)
            .await?
            .ok_or_else(|| DiscountError::UnknownCode(Discount::normalize_code(code)))?;

        match self
            .inner
            .perform_action(discount.id, DiscountAction::Redeem { order_id, subtotal })
            .await
        {
            Ok(DiscountActionResult::Redeem(redemption)) => Ok(redemption),
            Ok(_) => unreachable!("Redeem action must return Redeem result"),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    /// Give back the use held by `order_id`. A deleted code has nothing to
    /// give back.
    #[instrument(skip(self))]
    pub async fn release(&self, id: DiscountId, order_id: OrderId) -> Result<bool, DiscountError> {
        match self
            .inner
            .perform_action(id, DiscountAction::Release { order_id })
            .await
        {
            Ok(DiscountActionResult::Release(released)) => Ok(released),
            Ok(_) => unreachable!("Release action must return Release result"),
            Err(FrameworkError::NotFound(_)) => Ok(false),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    /// The organizer's codes, oldest first.
    #[instrument(skip(self))]
    pub async fn list_for_organizer(
        &self,
        organizer_id: UserId,
    ) -> Result<Vec<Discount>, DiscountError> {
        self.inner
            .list(move |d: &Discount| d.organizer_id == organizer_id)
            .await
            .map_err(Self::map_error)
    }
}
