//! Discount codes.
//!
//! A code belongs to one organizer and applies to any of that organizer's
//! events. It is redeemed when an order is placed and released if the order is
//! cancelled.

use crate::model::{DiscountId, OrderId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// `value` percent off, `0 < value <= 100`.
    Percentage,
    /// `value` off in the order's currency.
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discount {
    pub id: DiscountId,
    pub organizer_id: UserId,
    pub code: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub usage_limit: u32,
    pub used_count: u32,
    pub redemptions: BTreeSet<OrderId>,
    pub created_at: DateTime<Utc>,
}

impl Discount {
    /// Upper-cased and trimmed; codes compare in this form.
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Money taken off `subtotal`. Percentages round half-up to 2 places.
    /// Never more than the subtotal.
    pub fn amount_off(&self, subtotal: Decimal) -> Decimal {
        let raw = match self.kind {
            DiscountKind::Percentage => subtotal
                .checked_mul(self.value)
                .map(|scaled| scaled / Decimal::ONE_HUNDRED)
                .unwrap_or_else(|| subtotal / Decimal::ONE_HUNDRED * self.value)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            DiscountKind::Fixed => self.value,
        };
        raw.min(subtotal).max(Decimal::ZERO)
    }

    pub fn is_exhausted(&self) -> bool {
        self.used_count >= self.usage_limit
    }

    pub fn remaining(&self) -> u32 {
        self.usage_limit.saturating_sub(self.used_count)
    }

    /// Key that must be unique across the store: one code per organizer.
    pub fn scoped_key(organizer_id: UserId, code: &str) -> String {
        format!("{}:{}", organizer_id, Self::normalize_code(code))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountCreate {
    pub organizer_id: UserId,
    pub code: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub usage_limit: u32,
    pub created_at: DateTime<Utc>,
}

/// Codes are created and deleted, never edited.
#[derive(Debug, Clone)]
pub enum DiscountUpdate {}
