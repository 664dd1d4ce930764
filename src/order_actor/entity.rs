//! [`ActorEntity`] implementation for [`Order`].
//!
//! The hooks reach into the event and discount actors through the context.
//! Nothing they change here is committed unless the hook returns `Ok`, so a
//! refused settlement leaves the order `Pending` exactly as it was.

use super::actions::{Confirmation, OrderAction, OrderActionResult};
use super::error::OrderError;
use crate::clients::{DiscountClient, EventClient};
use crate::model::{
    AppliedDiscount, LineItem, Order, OrderCreate, OrderId, OrderStatus, OrderUpdate, QrToken,
    SettledLine, TicketSelection, UserId,
};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

/// Clients the order actor depends on.
pub type OrderContext = (EventClient, DiscountClient);

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = OrderUpdate;
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Context = OrderContext;
    type Error = OrderError;

    /// Checks the selection shape only. Prices, names and the organizer are
    /// filled in by [`on_create`](ActorEntity::on_create).
    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, OrderError> {
        if params.selections.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        if let Some(zero) = params.selections.iter().find(|s| s.quantity == 0) {
            return Err(OrderError::ZeroQuantity(zero.ticket_type));
        }

        let items = params
            .selections
            .iter()
            .map(|s| LineItem {
                ticket_type: s.ticket_type,
                name: String::new(),
                quantity: s.quantity,
                unit_price: Decimal::ZERO,
            })
            .collect();

        Ok(Order {
            id,
            event_id: params.event_id,
            organizer_id: UserId(0),
            buyer: params.buyer,
            items,
            subtotal: Decimal::ZERO,
            discount: None,
            total: Decimal::ZERO,
            currency: String::new(),
            status: OrderStatus::Pending,
            created_at: params.created_at,
            paid_at: None,
            payment_ref: None,
            qr_tokens: Vec::new(),
            checked_in_at: None,
            cancelled_at: None,
            requested_code: params
                .discount_code
                .filter(|code| !code.trim().is_empty()),
        })
    }

    /// Prices the order against the event, then redeems the discount code.
    async fn on_create(&mut self, ctx: &OrderContext) -> Result<(), OrderError> {
        let (events, discounts) = ctx;

        let selections = self
            .items
            .iter()
            .map(|item| TicketSelection::new(item.ticket_type, item.quantity))
            .collect();
        let quote = events
            .quote(self.event_id, selections, self.created_at)
            .await?;

        self.organizer_id = quote.organizer_id;
        self.currency = quote.currency;
        self.items = quote.items;
        self.subtotal = quote.subtotal;
        self.total = quote.subtotal;

        if let Some(code) = self.requested_code.take() {
            let redemption = discounts
                .redeem_code(self.organizer_id, &code, self.id, self.subtotal)
                .await?;
            self.total = self.subtotal - redemption.amount_off;
            self.discount = Some(AppliedDiscount {
                discount_id: redemption.discount_id,
                code: redemption.code,
                amount_off: redemption.amount_off,
            });
        }

        info!(
            order_id = %self.id,
            event_id = %self.event_id,
            seats = self.seat_count(),
            total = %self.total,
            "Order placed"
        );
        Ok(())
    }

    async fn on_update(&mut self, update: OrderUpdate, _ctx: &OrderContext) -> Result<(), OrderError> {
        match update {}
    }

    async fn handle_action(
        &mut self,
        action: OrderAction,
        ctx: &OrderContext,
    ) -> Result<OrderActionResult, OrderError> {
        let (events, discounts) = ctx;
        match action {
            OrderAction::ConfirmPayment { payment_ref, now } => {
                let replayed = self.confirm_payment(events, payment_ref, now).await?;
                Ok(OrderActionResult::ConfirmPayment(Confirmation {
                    order: self.clone(),
                    replayed,
                }))
            }
            OrderAction::Cancel { now } => {
                self.cancel(events, discounts, now).await?;
                Ok(OrderActionResult::Cancel(self.clone()))
            }
            OrderAction::CheckIn { now } => {
                self.check_in(now)?;
                Ok(OrderActionResult::CheckIn(self.clone()))
            }
            OrderAction::CheckInToken { token, now } => {
                self.check_in_token(&token, now)?;
                Ok(OrderActionResult::CheckInToken(self.clone()))
            }
        }
    }
}

impl Order {
    /// Returns `true` when the order had already been paid.
    async fn confirm_payment(
        &mut self,
        events: &EventClient,
        payment_ref: String,
        now: DateTime<Utc>,
    ) -> Result<bool, OrderError> {
        match self.status {
            OrderStatus::Paid | OrderStatus::CheckedIn => {
                debug!(order_id = %self.id, "Payment confirmation replayed");
                return Ok(true);
            }
            OrderStatus::Cancelled => {
                return Err(OrderError::InvalidTransition {
                    from: OrderStatus::Cancelled,
                    to: OrderStatus::Paid,
                })
            }
            OrderStatus::Pending => {}
        }

        let lines = self
            .items
            .iter()
            .map(|item| SettledLine {
                ticket_type: item.ticket_type,
                quantity: item.quantity,
            })
            .collect();
        events
            .settle(self.event_id, self.id, lines, self.total)
            .await?;

        self.status = OrderStatus::Paid;
        self.paid_at = Some(now);
        self.payment_ref = Some(payment_ref);
        self.qr_tokens = self
            .items
            .iter()
            .flat_map(|item| (0..item.quantity).map(move |_| item.ticket_type))
            .map(|ticket_type| QrToken {
                token: Uuid::new_v4().simple().to_string(),
                ticket_type,
                checked_in_at: None,
            })
            .collect();

        info!(order_id = %self.id, seats = self.qr_tokens.len(), "Order paid");
        Ok(false)
    }

    async fn cancel(
        &mut self,
        events: &EventClient,
        discounts: &DiscountClient,
        now: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        let from = self.status;
        if from == OrderStatus::Cancelled {
            return Ok(());
        }
        if !from.can_transition_to(OrderStatus::Cancelled) {
            return Err(OrderError::InvalidTransition {
                from,
                to: OrderStatus::Cancelled,
            });
        }
        let admitted = self.qr_tokens.iter().filter(|t| t.is_used()).count();
        if admitted > 0 {
            return Err(OrderError::SeatsAdmitted { admitted });
        }

        if from == OrderStatus::Paid {
            events.release(self.event_id, self.id).await?;
        }
        if let Some(discount) = &self.discount {
            discounts.release(discount.discount_id, self.id).await?;
        }

        self.status = OrderStatus::Cancelled;
        self.cancelled_at = Some(now);
        info!(order_id = %self.id, %from, "Order cancelled");
        Ok(())
    }

    fn check_in(&mut self, now: DateTime<Utc>) -> Result<(), OrderError> {
        if self.status != OrderStatus::Paid {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: OrderStatus::CheckedIn,
            });
        }
        for token in self.qr_tokens.iter_mut().filter(|t| !t.is_used()) {
            token.checked_in_at = Some(now);
        }
        self.status = OrderStatus::CheckedIn;
        self.checked_in_at = Some(now);
        info!(order_id = %self.id, "Order checked in");
        Ok(())
    }

    fn check_in_token(&mut self, token: &str, now: DateTime<Utc>) -> Result<(), OrderError> {
        let status = self.status;
        let seat = self
            .qr_tokens
            .iter_mut()
            .find(|t| t.token == token)
            .ok_or_else(|| OrderError::UnknownToken(token.to_string()))?;
        if seat.is_used() {
            return Err(OrderError::TokenAlreadyUsed(token.to_string()));
        }
        if status != OrderStatus::Paid {
            return Err(OrderError::InvalidTransition {
                from: status,
                to: OrderStatus::CheckedIn,
            });
        }
        seat.checked_in_at = Some(now);

        if self.qr_tokens.iter().all(QrToken::is_used) {
            self.status = OrderStatus::CheckedIn;
            self.checked_in_at = Some(now);
        }
        debug!(order_id = %self.id, "Seat checked in");
        Ok(())
    }
}
