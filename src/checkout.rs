//! # Checkout
//!
//! The shopper's path: place a pending order, then pay for it.
//!
//! `pay` can be replayed safely. The gateway charges an order at most once and
//! the order actor confirms it at most once, so a second `pay` after a lost
//! reply (or a double click) returns the first receipt.

use crate::clients::{OrderClient, UserClient};
use crate::clock::Clock;
use crate::model::{Buyer, EventId, Order, OrderCreate, OrderId, OrderStatus, TicketSelection, UserId};
use crate::order_actor::OrderError;
use crate::payment::{ChargeRequest, PaymentError, PaymentGateway};
use crate::user_actor::UserError;
use actor_framework::{retry_transient, RetryPolicy};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Payment(#[from] PaymentError),
}

impl CheckoutError {
    pub fn is_transient(&self) -> bool {
        match self {
            CheckoutError::User(e) => e.is_transient(),
            CheckoutError::Order(e) => e.is_transient(),
            CheckoutError::Payment(e) => e.is_transient(),
        }
    }
}

/// Proof of payment handed back to the shopper.
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub order: Order,
    pub payment_ref: String,
    pub amount: Decimal,
    pub currency: String,
    /// The order had already been paid before this call.
    pub replayed: bool,
}

#[derive(Clone)]
pub struct Checkout {
    orders: OrderClient,
    users: UserClient,
    gateway: Arc<dyn PaymentGateway>,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
}

impl Checkout {
    pub fn new(
        orders: OrderClient,
        users: UserClient,
        gateway: Arc<dyn PaymentGateway>,
        clock: Arc<dyn Clock>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            orders,
            users,
            gateway,
            clock,
            retry,
        }
    }

    /// Price and reserve nothing yet: the order is `Pending` until paid.
    #[instrument(skip(self, selections))]
    pub async fn place_order(
        &self,
        buyer: UserId,
        event_id: EventId,
        selections: Vec<TicketSelection>,
        discount_code: Option<&str>,
    ) -> Result<Order, CheckoutError> {
        let user = self.users.fetch(buyer).await?;
        let id = self
            .orders
            .place_order(OrderCreate {
                event_id,
                buyer: Buyer {
                    user_id: user.id,
                    name: user.name,
                    email: user.email,
                },
                selections,
                discount_code: discount_code.map(str::to_string),
                created_at: self.clock.now(),
            })
            .await?;
        Ok(self.orders.fetch(id).await?)
    }

    /// The shopper's own orders, newest first. Paid ones carry their seat
    /// tokens.
    #[instrument(skip(self))]
    pub async fn my_orders(&self, buyer: UserId) -> Result<Vec<Order>, CheckoutError> {
        let user = self.users.fetch(buyer).await?;
        Ok(self.orders.orders_for_buyer(user.id).await?)
    }

    /// Charge the card and confirm the order.
    ///
    /// Free orders skip the gateway. If the confirmation is refused (sold out
    /// in the meantime, order cancelled) the charge is refunded.
    #[instrument(skip(self, card_number))]
    pub async fn pay(&self, order_id: OrderId, card_number: &str) -> Result<Receipt, CheckoutError> {
        let order = self.orders.fetch(order_id).await?;
        match order.status {
            OrderStatus::Paid | OrderStatus::CheckedIn => {
                info!(%order_id, "Order already paid");
                return Ok(receipt(order, true));
            }
            OrderStatus::Cancelled => {
                return Err(OrderError::InvalidTransition {
                    from: OrderStatus::Cancelled,
                    to: OrderStatus::Paid,
                }
                .into())
            }
            OrderStatus::Pending => {}
        }

        let charged = if order.total > Decimal::ZERO {
            let charge = self
                .gateway
                .charge(ChargeRequest {
                    order_id,
                    amount: order.total,
                    currency: order.currency.clone(),
                    card_number: card_number.to_string(),
                })
                .await?;
            Some(charge.payment_ref)
        } else {
            None
        };
        let payment_ref = charged
            .clone()
            .unwrap_or_else(|| format!("free_{order_id}"));

        let now = self.clock.now();
        let confirmed = retry_transient(&self.retry, || {
            self.orders.confirm_payment(order_id, payment_ref.clone(), now)
        })
        .await;

        match confirmed {
            Ok(confirmation) => Ok(receipt(confirmation.order, confirmation.replayed)),
            Err(err) => {
                if let Some(payment_ref) = charged.filter(|_| !err.is_transient()) {
                    warn!(%order_id, error = %err, "Confirmation refused, refunding");
                    if let Err(refund) = self.gateway.refund(&payment_ref).await {
                        warn!(%order_id, error = %refund, "Refund failed");
                    }
                }
                Err(err.into())
            }
        }
    }
}

fn receipt(order: Order, replayed: bool) -> Receipt {
    Receipt {
        payment_ref: order.payment_ref.clone().unwrap_or_default(),
        amount: order.total,
        currency: order.currency.clone(),
        replayed,
        order,
    }
}
