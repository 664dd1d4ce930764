//! [`ActorEntity`] implementation for [`Discount`].

use super::actions::{DiscountAction, DiscountActionResult, Redemption};
use super::error::DiscountError;
use crate::model::{Discount, DiscountCreate, DiscountId, DiscountKind, DiscountUpdate};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use tracing::{debug, info};

#[async_trait]
impl ActorEntity for Discount {
    type Id = DiscountId;
    type Create = DiscountCreate;
    type Update = DiscountUpdate;
    type Action = DiscountAction;
    type ActionResult = DiscountActionResult;
    type Context = ();
    type Error = DiscountError;

    fn from_create_params(id: DiscountId, params: DiscountCreate) -> Result<Self, DiscountError> {
        let code = Discount::normalize_code(&params.code);
        if code.is_empty() {
            return Err(DiscountError::Validation("code is required".into()));
        }
        if !code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DiscountError::Validation(format!(
                "code {code:?} may only contain letters, digits, '-' and '_'"
            )));
        }
        match params.kind {
            DiscountKind::Percentage
                if params.value <= Decimal::ZERO || params.value > Decimal::ONE_HUNDRED =>
            {
                return Err(DiscountError::Validation(
                    "percentage must be above 0 and at most 100".into(),
                ));
            }
            DiscountKind::Fixed if params.value <= Decimal::ZERO => {
                return Err(DiscountError::Validation(
                    "fixed amount must be above 0".into(),
                ));
            }
            _ => {}
        }
        if params.usage_limit == 0 {
            return Err(DiscountError::Validation(
                "usage limit must be at least 1".into(),
            ));
        }

        Ok(Discount {
            id,
            organizer_id: params.organizer_id,
            code,
            kind: params.kind,
            value: params.value,
            usage_limit: params.usage_limit,
            used_count: 0,
            redemptions: BTreeSet::new(),
            created_at: params.created_at,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(Discount::scoped_key(self.organizer_id, &self.code))
    }

    async fn on_update(&mut self, update: DiscountUpdate, _ctx: &()) -> Result<(), DiscountError> {
        match update {}
    }

    async fn handle_action(
        &mut self,
        action: DiscountAction,
        _ctx: &(),
    ) -> Result<DiscountActionResult, DiscountError> {
        match action {
            DiscountAction::Redeem { order_id, subtotal } => {
                let replayed = self.redemptions.contains(&order_id);
                if replayed {
                    debug!(code = %self.code, %order_id, "Redemption replayed");
                } else {
                    if self.is_exhausted() {
                        return Err(DiscountError::Exhausted {
                            code: self.code.clone(),
                            limit: self.usage_limit,
                        });
                    }
                    self.used_count += 1;
                    self.redemptions.insert(order_id);
                    info!(code = %self.code, %order_id, used = self.used_count, "Discount redeemed");
                }
                Ok(DiscountActionResult::Redeem(Redemption {
                    discount_id: self.id,
                    code: self.code.clone(),
                    amount_off: self.amount_off(subtotal),
                    replayed,
                }))
            }
            DiscountAction::Release { order_id } => {
                let released = self.redemptions.remove(&order_id);
                if released {
                    self.used_count = self.used_count.saturating_sub(1);
                    info!(code = %self.code, %order_id, used = self.used_count, "Discount released");
                }
                Ok(DiscountActionResult::Release(released))
            }
        }
    }
}
