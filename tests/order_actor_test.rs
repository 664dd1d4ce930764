//! Real Order actor, mocked Event and Discount actors.
//!
//! These tests pin down which downstream calls each order operation makes,
//! and that a refused downstream call leaves the order untouched.

use actor_framework::mock::MockClient;
use actor_framework::{ActorClient, FrameworkError};
use box_office::clients::{DiscountClient, EventClient, OrderClient};
use box_office::discount_actor::{DiscountActionResult, Redemption};
use box_office::event_actor::{EventActionResult, EventError, Quote, SettleOutcome};
use box_office::model::{
    Buyer, Discount, DiscountId, DiscountKind, Event, EventId, LineItem, Order, OrderCreate, OrderId,
    OrderStatus, TicketSelection, TicketTypeId, UserId,
};
use box_office::order_actor::{self, OrderError};
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use tokio::task::JoinHandle;

struct Harness {
    events: MockClient<Event>,
    discounts: MockClient<Discount>,
    orders: OrderClient,
    handle: JoinHandle<()>,
}

impl Harness {
    fn new() -> Self {
        let events = MockClient::<Event>::new();
        let discounts = MockClient::<Discount>::new();
        let (actor, orders) = order_actor::new(10);
        let handle = tokio::spawn(actor.run((
            EventClient::new(events.client()),
            DiscountClient::new(discounts.client()),
        )));
        Self {
            events,
            discounts,
            orders,
            handle,
        }
    }

    async fn finish(self) {
        self.events.verify();
        self.discounts.verify();
        drop(self.orders);
        self.handle.await.unwrap();
    }
}

fn quote(quantity: u32) -> Quote {
    Quote {
        event_id: EventId(1),
        organizer_id: UserId(7),
        currency: "NGN".into(),
        items: vec![LineItem {
            ticket_type: TicketTypeId(1),
            name: "Regular".into(),
            quantity,
            unit_price: Decimal::from(50),
        }],
        subtotal: Decimal::from(50) * Decimal::from(quantity),
    }
}

fn create(quantity: u32, code: Option<&str>) -> OrderCreate {
    OrderCreate {
        event_id: EventId(1),
        buyer: Buyer {
            user_id: UserId(2),
            name: "Ada Obi".into(),
            email: "ada@example.com".into(),
        },
        selections: vec![TicketSelection::new(TicketTypeId(1), quantity)],
        discount_code: code.map(str::to_string),
        created_at: Utc::now(),
    }
}

fn early_bird() -> Discount {
    Discount {
        id: DiscountId(3),
        organizer_id: UserId(7),
        code: "EARLY".into(),
        kind: DiscountKind::Percentage,
        value: Decimal::from(10),
        usage_limit: 5,
        used_count: 0,
        redemptions: BTreeSet::new(),
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn placing_an_order_prices_it_from_the_event() {
    let mut h = Harness::new();
    h.events
        .expect_action(EventId(1))
        .return_ok(EventActionResult::Quote(quote(3)));

    let id = h.orders.place_order(create(3, None)).await.unwrap();
    let order = h.orders.fetch(id).await.unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.organizer_id, UserId(7));
    assert_eq!(order.items[0].name, "Regular");
    assert_eq!(order.subtotal, Decimal::from(150));
    assert_eq!(order.total, Decimal::from(150));
    assert!(order.qr_tokens.is_empty());
    h.finish().await;
}

#[tokio::test]
async fn discount_code_is_redeemed_for_the_new_order() {
    let mut h = Harness::new();
    h.events
        .expect_action(EventId(1))
        .return_ok(EventActionResult::Quote(quote(2)));
    h.discounts.expect_list().return_ok(vec![early_bird()]);
    h.discounts
        .expect_action(DiscountId(3))
        .return_ok(DiscountActionResult::Redeem(Redemption {
            discount_id: DiscountId(3),
            code: "EARLY".into(),
            amount_off: Decimal::from(10),
            replayed: false,
        }));

    let id = h.orders.place_order(create(2, Some("early"))).await.unwrap();
    let order = h.orders.fetch(id).await.unwrap();

    assert_eq!(order.subtotal, Decimal::from(100));
    assert_eq!(order.total, Decimal::from(90));
    assert_eq!(order.discount.unwrap().code, "EARLY");
    h.finish().await;
}

#[tokio::test]
async fn empty_order_is_rejected_before_any_downstream_call() {
    let h = Harness::new();
    let mut params = create(1, None);
    params.selections.clear();

    assert_eq!(
        h.orders.place_order(params).await.unwrap_err(),
        OrderError::EmptyOrder
    );
    assert!(h.orders.list(|_: &Order| true).await.unwrap().is_empty());
    // No expectations were set: any call to the mocks would have failed.
    h.finish().await;
}

#[tokio::test]
async fn sold_out_quote_is_reported_typed_and_nothing_is_stored() {
    let mut h = Harness::new();
    h.events
        .expect_action(EventId(1))
        .return_err(FrameworkError::EntityError(Box::new(
            EventError::InsufficientInventory {
                ticket_type: TicketTypeId(1),
                requested: 4,
                available: 1,
            },
        )));

    let err = h.orders.place_order(create(4, None)).await.unwrap_err();
    assert!(matches!(
        err,
        OrderError::Event(EventError::InsufficientInventory { available: 1, .. })
    ));
    assert!(h.orders.get(OrderId(1)).await.unwrap().is_none());
    h.finish().await;
}

#[tokio::test]
async fn confirming_settles_once_and_issues_a_token_per_seat() {
    let mut h = Harness::new();
    h.events
        .expect_action(EventId(1))
        .return_ok(EventActionResult::Quote(quote(3)));
    h.events
        .expect_action(EventId(1))
        .return_ok(EventActionResult::Settle(SettleOutcome { replayed: false }));

    let id = h.orders.place_order(create(3, None)).await.unwrap();
    let first = h
        .orders
        .confirm_payment(id, "pay_1".into(), Utc::now())
        .await
        .unwrap();
    assert!(!first.replayed);
    assert_eq!(first.order.status, OrderStatus::Paid);
    assert_eq!(first.order.qr_tokens.len(), 3);
    assert_eq!(first.order.payment_ref.as_deref(), Some("pay_1"));

    // The replay never reaches the event actor.
    let second = h
        .orders
        .confirm_payment(id, "pay_1".into(), Utc::now())
        .await
        .unwrap();
    assert!(second.replayed);
    assert_eq!(second.order.qr_tokens, first.order.qr_tokens);
    h.finish().await;
}

#[tokio::test]
async fn refused_settlement_leaves_the_order_pending() {
    let mut h = Harness::new();
    h.events
        .expect_action(EventId(1))
        .return_ok(EventActionResult::Quote(quote(1)));
    h.events
        .expect_action(EventId(1))
        .return_err(FrameworkError::EntityError(Box::new(
            EventError::InsufficientInventory {
                ticket_type: TicketTypeId(1),
                requested: 1,
                available: 0,
            },
        )));

    let id = h.orders.place_order(create(1, None)).await.unwrap();
    let err = h
        .orders
        .confirm_payment(id, "pay_1".into(), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Event(_)));

    let order = h.orders.fetch(id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(order.qr_tokens.is_empty());
    assert_eq!(order.paid_at, None);
    h.finish().await;
}

#[tokio::test]
async fn cancelling_a_pending_order_only_releases_the_discount() {
    let mut h = Harness::new();
    h.events
        .expect_action(EventId(1))
        .return_ok(EventActionResult::Quote(quote(2)));
    h.discounts.expect_list().return_ok(vec![early_bird()]);
    h.discounts
        .expect_action(DiscountId(3))
        .return_ok(DiscountActionResult::Redeem(Redemption {
            discount_id: DiscountId(3),
            code: "EARLY".into(),
            amount_off: Decimal::from(10),
            replayed: false,
        }));
    h.discounts
        .expect_action(DiscountId(3))
        .return_ok(DiscountActionResult::Release(true));

    let id = h.orders.place_order(create(2, Some("EARLY"))).await.unwrap();
    let cancelled = h.orders.cancel(id, Utc::now()).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    // Second cancel is a no-op and calls nobody.
    let again = h.orders.cancel(id, Utc::now()).await.unwrap();
    assert_eq!(again.cancelled_at, cancelled.cancelled_at);
    h.finish().await;
}

#[tokio::test]
async fn cancelling_a_paid_order_releases_the_settlement() {
    let mut h = Harness::new();
    h.events
        .expect_action(EventId(1))
        .return_ok(EventActionResult::Quote(quote(1)));
    h.events
        .expect_action(EventId(1))
        .return_ok(EventActionResult::Settle(SettleOutcome { replayed: false }));
    h.events
        .expect_action(EventId(1))
        .return_ok(EventActionResult::Release(true));

    let id = h.orders.place_order(create(1, None)).await.unwrap();
    h.orders
        .confirm_payment(id, "pay_1".into(), Utc::now())
        .await
        .unwrap();
    let cancelled = h.orders.cancel(id, Utc::now()).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    let err = h
        .orders
        .confirm_payment(id, "pay_2".into(), Utc::now())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        OrderError::InvalidTransition {
            from: OrderStatus::Cancelled,
            to: OrderStatus::Paid
        }
    );
    h.finish().await;
}
