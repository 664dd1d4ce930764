//! # Payment
//!
//! [`PaymentGateway`] is the seam to a card processor. [`SimulatedGateway`]
//! stands in for one: it validates the card, declines a fixed test number,
//! waits a configurable delay and never charges an order twice.

use crate::model::OrderId;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Card numbers ending in this are always declined.
pub const DECLINED_SUFFIX: &str = "0002";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PaymentError {
    #[error("Invalid card number")]
    InvalidCard,

    #[error("Card declined")]
    Declined,

    #[error("Unknown payment reference: {0}")]
    UnknownCharge(String),

    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),
}

impl PaymentError {
    pub fn is_transient(&self) -> bool {
        matches!(self, PaymentError::Unavailable(_))
    }
}

#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub order_id: OrderId,
    pub amount: Decimal,
    pub currency: String,
    pub card_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Charge {
    pub payment_ref: String,
    pub order_id: OrderId,
    pub amount: Decimal,
    pub currency: String,
    /// Masked card, last four digits only.
    pub card: String,
    /// The order had been charged before; this is the original charge.
    pub replayed: bool,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    /// Charge `request.amount`. At most one live charge exists per order;
    /// charging again returns it with `replayed = true`.
    async fn charge(&self, request: ChargeRequest) -> Result<Charge, PaymentError>;

    /// Return a captured charge to the card.
    async fn refund(&self, payment_ref: &str) -> Result<(), PaymentError>;
}

/// In-process gateway for demos and tests.
#[derive(Debug, Default)]
pub struct SimulatedGateway {
    delay: Duration,
    charges: Mutex<HashMap<OrderId, Charge>>,
}

impl SimulatedGateway {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            charges: Mutex::new(HashMap::new()),
        }
    }

    /// Live (unrefunded) charges.
    pub fn charge_count(&self) -> usize {
        self.charges().len()
    }

    fn charges(&self) -> MutexGuard<'_, HashMap<OrderId, Charge>> {
        self.charges.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    #[instrument(skip(self, request), fields(order_id = %request.order_id, amount = %request.amount))]
    async fn charge(&self, request: ChargeRequest) -> Result<Charge, PaymentError> {
        let digits: String = request
            .card_number
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        if digits.len() < 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PaymentError::InvalidCard);
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let Some(existing) = self.charges().get(&request.order_id) {
            debug!(payment_ref = %existing.payment_ref, "Charge replayed");
            return Ok(Charge {
                replayed: true,
                ..existing.clone()
            });
        }

        if digits.ends_with(DECLINED_SUFFIX) {
            warn!("Card declined");
            return Err(PaymentError::Declined);
        }

        let charge = Charge {
            payment_ref: format!("pay_{}", Uuid::new_v4().simple()),
            order_id: request.order_id,
            amount: request.amount,
            currency: request.currency,
            card: format!("**** {}", &digits[digits.len() - 4..]),
            replayed: false,
        };
        // A concurrent charge for the same order may have landed during the
        // delay; the first one wins.
        let stored = self
            .charges()
            .entry(request.order_id)
            .or_insert_with(|| charge.clone())
            .clone();
        let replayed = stored.payment_ref != charge.payment_ref;
        if !replayed {
            info!(payment_ref = %stored.payment_ref, "Card charged");
        }
        Ok(Charge { replayed, ..stored })
    }

    #[instrument(skip(self))]
    async fn refund(&self, payment_ref: &str) -> Result<(), PaymentError> {
        let mut charges = self.charges();
        let order_id = charges
            .iter()
            .find(|(_, c)| c.payment_ref == payment_ref)
            .map(|(id, _)| *id)
            .ok_or_else(|| PaymentError::UnknownCharge(payment_ref.to_string()))?;
        charges.remove(&order_id);
        info!(%order_id, "Charge refunded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(order: u32, card: &str) -> ChargeRequest {
        ChargeRequest {
            order_id: OrderId(order),
            amount: Decimal::new(2500, 2),
            currency: "NGN".into(),
            card_number: card.into(),
        }
    }

    #[tokio::test]
    async fn charges_once_per_order() {
        let gateway = SimulatedGateway::default();
        let first = gateway.charge(request(1, "4242 4242 4242 4242")).await.unwrap();
        let second = gateway.charge(request(1, "4242424242424242")).await.unwrap();

        assert!(!first.replayed);
        assert!(second.replayed);
        assert_eq!(first.payment_ref, second.payment_ref);
        assert_eq!(first.card, "**** 4242");
        assert_eq!(gateway.charge_count(), 1);
    }

    #[tokio::test]
    async fn rejects_bad_cards_and_declines_the_test_number() {
        let gateway = SimulatedGateway::default();
        for card in ["", "123", "4242-abcd"] {
            assert_eq!(
                gateway.charge(request(1, card)).await.unwrap_err(),
                PaymentError::InvalidCard
            );
        }
        assert_eq!(
            gateway.charge(request(1, "4000000000000002")).await.unwrap_err(),
            PaymentError::Declined
        );
        assert_eq!(gateway.charge_count(), 0);
    }

    #[tokio::test]
    async fn refund_frees_the_order_for_a_new_charge() {
        let gateway = SimulatedGateway::default();
        let charge = gateway.charge(request(3, "1111")).await.unwrap();
        gateway.refund(&charge.payment_ref).await.unwrap();
        assert_eq!(gateway.charge_count(), 0);
        assert_eq!(
            gateway.refund(&charge.payment_ref).await.unwrap_err(),
            PaymentError::UnknownCharge(charge.payment_ref.clone())
        );

        let again = gateway.charge(request(3, "1111")).await.unwrap();
        assert_ne!(again.payment_ref, charge.payment_ref);
    }

    #[tokio::test]
    async fn waits_the_configured_delay() {
        let gateway = SimulatedGateway::new(Duration::from_millis(40));
        let started = tokio::time::Instant::now();
        gateway.charge(request(1, "4242")).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(40));
    }
}
