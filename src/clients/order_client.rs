//! # Order Client
//!
//! Besides the typed actions, this client offers [`OrderWatch`], a live view
//! of one event's orders built on the actor's change stream.

use crate::model::{EventId, Order, OrderCreate, OrderId, UserId};
use crate::order_actor::{Confirmation, OrderAction, OrderActionResult, OrderError};
use actor_framework::{ActorClient, Change, FrameworkError, ResourceClient, Subscription};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

/// Client for interacting with the Order actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.downcast_entity::<OrderError>() {
            Ok(err) => err,
            Err(FrameworkError::NotFound(id)) => OrderError::NotFound(id),
            Err(other) => OrderError::Unavailable(other.to_string()),
        }
    }
}

impl OrderClient {
    /// Place a pending order. Pricing and discount redemption happen inside
    /// the actor; `InsufficientInventory` and friends come back wrapped in
    /// [`OrderError::Event`].
    #[instrument(skip(self, params), fields(event_id = %params.event_id))]
    pub async fn place_order(&self, params: OrderCreate) -> Result<OrderId, OrderError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self, id: OrderId) -> Result<Order, OrderError> {
        self.get(id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn confirm_payment(
        &self,
        id: OrderId,
        payment_ref: String,
        now: DateTime<Utc>,
    ) -> Result<Confirmation, OrderError> {
        match self
            .act(id, OrderAction::ConfirmPayment { payment_ref, now })
            .await?
        {
            OrderActionResult::ConfirmPayment(confirmation) => Ok(confirmation),
            _ => unreachable!("ConfirmPayment action must return ConfirmPayment result"),
        }
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, id: OrderId, now: DateTime<Utc>) -> Result<Order, OrderError> {
        match self.act(id, OrderAction::Cancel { now }).await? {
            OrderActionResult::Cancel(order) => Ok(order),
            _ => unreachable!("Cancel action must return Cancel result"),
        }
    }

    #[instrument(skip(self))]
    pub async fn check_in(&self, id: OrderId, now: DateTime<Utc>) -> Result<Order, OrderError> {
        match self.act(id, OrderAction::CheckIn { now }).await? {
            OrderActionResult::CheckIn(order) => Ok(order),
            _ => unreachable!("CheckIn action must return CheckIn result"),
        }
    }

    #[instrument(skip(self, token))]
    pub async fn check_in_token(
        &self,
        id: OrderId,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Order, OrderError> {
        let action = OrderAction::CheckInToken {
            token: token.to_string(),
            now,
        };
        match self.act(id, action).await? {
            OrderActionResult::CheckInToken(order) => Ok(order),
            _ => unreachable!("CheckInToken action must return CheckInToken result"),
        }
    }

    /// The order holding seat `token`, if any.
    #[instrument(skip(self, token))]
    pub async fn find_by_token(&self, token: &str) -> Result<Option<Order>, OrderError> {
        let token = token.trim().to_string();
        let found = self
            .inner
            .list(move |o: &Order| o.token(&token).is_some())
            .await
            .map_err(Self::map_error)?;
        Ok(found.into_iter().next())
    }

    /// All orders of one event, newest first.
    #[instrument(skip(self))]
    pub async fn orders_for_event(&self, event_id: EventId) -> Result<Vec<Order>, OrderError> {
        let mut orders = self
            .inner
            .list(move |o: &Order| o.event_id == event_id)
            .await
            .map_err(Self::map_error)?;
        newest_first(&mut orders);
        Ok(orders)
    }

    /// One buyer's own orders across every event, newest first.
    #[instrument(skip(self))]
    pub async fn orders_for_buyer(&self, buyer: UserId) -> Result<Vec<Order>, OrderError> {
        let mut orders = self
            .inner
            .list(move |o: &Order| o.buyer.user_id == buyer)
            .await
            .map_err(Self::map_error)?;
        newest_first(&mut orders);
        Ok(orders)
    }

    /// All orders placed under one organizer's events.
    #[instrument(skip(self))]
    pub async fn orders_for_organizer(
        &self,
        organizer_id: UserId,
    ) -> Result<Vec<Order>, OrderError> {
        self.inner
            .list(move |o: &Order| o.organizer_id == organizer_id)
            .await
            .map_err(Self::map_error)
    }

    /// Start watching one event's orders.
    #[instrument(skip(self))]
    pub async fn watch_event(&self, event_id: EventId) -> Result<OrderWatch, OrderError> {
        let subscription = self.subscribe().await?;
        Ok(OrderWatch::new(self.clone(), event_id, subscription))
    }

    async fn act(&self, id: OrderId, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }
}

fn newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

/// Live list of one event's orders.
///
/// Dropping the watch drops its subscription.
pub struct OrderWatch {
    client: OrderClient,
    event_id: EventId,
    subscription: Subscription<Order>,
    orders: BTreeMap<OrderId, Order>,
}

impl OrderWatch {
    fn new(client: OrderClient, event_id: EventId, subscription: Subscription<Order>) -> Self {
        let mut watch = Self {
            client,
            event_id,
            subscription,
            orders: BTreeMap::new(),
        };
        watch.load_snapshot();
        watch
    }

    fn load_snapshot(&mut self) {
        let event_id = self.event_id;
        self.orders = self
            .subscription
            .take_snapshot()
            .into_iter()
            .filter(|o| o.event_id == event_id)
            .map(|o| (o.id, o))
            .collect();
    }

    /// The orders as currently known, newest first.
    pub fn current(&self) -> Vec<Order> {
        let mut orders: Vec<Order> = self.orders.values().cloned().collect();
        newest_first(&mut orders);
        orders
    }

    /// Wait until this event's orders change and return the full list.
    /// `None` once the order actor has shut down.
    pub async fn changed(&mut self) -> Option<Vec<Order>> {
        loop {
            match self.subscription.next().await? {
                Change::Upserted(order) if order.event_id == self.event_id => {
                    self.orders.insert(order.id, order);
                    return Some(self.current());
                }
                Change::Upserted(_) => {}
                Change::Deleted(id) => {
                    if self.orders.remove(&id).is_some() {
                        return Some(self.current());
                    }
                }
                Change::Lagged { missed } => {
                    warn!(event_id = %self.event_id, missed, "Order watch lagged, resubscribing");
                    self.subscription = self.client.subscribe().await.ok()?;
                    self.load_snapshot();
                    return Some(self.current());
                }
            }
        }
    }
}
