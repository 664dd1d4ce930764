//! End-to-end checkout with every actor real and a simulated gateway.

mod common;

use box_office::checkout::CheckoutError;
use box_office::discount_actor::DiscountError;
use box_office::event_actor::EventError;
use box_office::model::{DiscountKind, OrderStatus, TicketSelection, TicketTypeDraft};
use box_office::order_actor::OrderError;
use box_office::payment::PaymentError;
use box_office::user_actor::UserError;
use chrono::Duration;
use common::{regular, TestOffice, CARD};
use rust_decimal::Decimal;

#[tokio::test]
async fn paying_settles_seats_counters_and_revenue_together() {
    let t = TestOffice::start();
    let host = t.organizer("Kemi").await;
    let buyer = t.attendee("Ada").await;
    let event = t.live_event(host, vec![regular(5000, 10)]).await;
    let ticket = event.ticket_types[0].id;

    let order = t
        .office
        .checkout
        .place_order(buyer, event.id, vec![TicketSelection::new(ticket, 3)], None)
        .await
        .expect("Failed to place order");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total, Decimal::from(15000));
    assert_eq!(order.currency, "NGN");
    assert_eq!(order.buyer.email, "ada@example.com");

    // Placing alone moves nothing.
    let before = t.office.events.fetch(event.id).await.unwrap();
    assert_eq!(before.tickets_sold, 0);

    let receipt = t.office.checkout.pay(order.id, CARD).await.expect("Payment failed");
    assert!(!receipt.replayed);
    assert_eq!(receipt.amount, Decimal::from(15000));
    assert_eq!(receipt.order.status, OrderStatus::Paid);
    assert_eq!(receipt.order.qr_tokens.len(), 3);
    assert!(receipt.payment_ref.starts_with("pay_"));

    let after = t.office.events.fetch(event.id).await.unwrap();
    assert_eq!(after.ticket_types[0].quantity_sold, 3);
    assert_eq!(after.tickets_sold, 3);
    assert_eq!(after.revenue, Decimal::from(15000));
    assert!(after.is_settled(order.id));
    t.shutdown().await;
}

#[tokio::test]
async fn replayed_payment_returns_the_first_receipt() {
    let t = TestOffice::start();
    let host = t.organizer("Kemi").await;
    let buyer = t.attendee("Ada").await;
    let event = t.live_event(host, vec![regular(2500, 10)]).await;
    let ticket = event.ticket_types[0].id;

    let order = t
        .office
        .checkout
        .place_order(buyer, event.id, vec![TicketSelection::new(ticket, 2)], None)
        .await
        .unwrap();
    let first = t.office.checkout.pay(order.id, CARD).await.unwrap();
    let second = t.office.checkout.pay(order.id, CARD).await.unwrap();

    assert!(second.replayed);
    assert_eq!(second.payment_ref, first.payment_ref);
    assert_eq!(second.order.qr_tokens, first.order.qr_tokens);
    assert_eq!(t.gateway.charge_count(), 1);

    let event = t.office.events.fetch(event.id).await.unwrap();
    assert_eq!(event.tickets_sold, 2);
    assert_eq!(event.revenue, Decimal::from(5000));
    t.shutdown().await;
}

#[tokio::test]
async fn last_seat_goes_to_exactly_one_buyer() {
    let t = TestOffice::start();
    let host = t.organizer("Kemi").await;
    let ada = t.attendee("Ada").await;
    let bayo = t.attendee("Bayo").await;
    let event = t.live_event(host, vec![regular(9000, 1)]).await;
    let ticket = event.ticket_types[0].id;

    // Both quotes see the one free seat.
    let first = t
        .office
        .checkout
        .place_order(ada, event.id, vec![TicketSelection::new(ticket, 1)], None)
        .await
        .unwrap();
    let second = t
        .office
        .checkout
        .place_order(bayo, event.id, vec![TicketSelection::new(ticket, 1)], None)
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        t.office.checkout.pay(first.id, CARD),
        t.office.checkout.pay(second.id, CARD)
    );
    let (won, lost) = match (a, b) {
        (Ok(won), Err(lost)) | (Err(lost), Ok(won)) => (won, lost),
        other => panic!("expected one winner, got {other:?}"),
    };

    assert_eq!(won.order.status, OrderStatus::Paid);
    assert!(matches!(
        lost,
        CheckoutError::Order(OrderError::Event(EventError::InsufficientInventory {
            available: 0,
            ..
        }))
    ));
    // The loser's charge was refunded.
    assert_eq!(t.gateway.charge_count(), 1);

    let event = t.office.events.fetch(event.id).await.unwrap();
    assert_eq!(event.ticket_types[0].quantity_sold, 1);
    assert_eq!(event.tickets_sold, 1);
    assert_eq!(event.revenue, Decimal::from(9000));

    let loser = if won.order.id == first.id { second.id } else { first.id };
    let loser = t.office.orders.fetch(loser).await.unwrap();
    assert_eq!(loser.status, OrderStatus::Pending);
    assert!(loser.qr_tokens.is_empty());
    t.shutdown().await;
}

#[tokio::test]
async fn invalid_selections_are_rejected_at_placement() {
    let t = TestOffice::start();
    let host = t.organizer("Kemi").await;
    let buyer = t.attendee("Ada").await;
    let event = t.live_event(host, vec![regular(1000, 2)]).await;
    let ticket = event.ticket_types[0].id;

    let empty = t
        .office
        .checkout
        .place_order(buyer, event.id, Vec::new(), None)
        .await
        .unwrap_err();
    assert_eq!(empty, CheckoutError::Order(OrderError::EmptyOrder));

    let zero = t
        .office
        .checkout
        .place_order(buyer, event.id, vec![TicketSelection::new(ticket, 0)], None)
        .await
        .unwrap_err();
    assert_eq!(zero, CheckoutError::Order(OrderError::ZeroQuantity(ticket)));

    let too_many = t
        .office
        .checkout
        .place_order(buyer, event.id, vec![TicketSelection::new(ticket, 3)], None)
        .await
        .unwrap_err();
    assert!(matches!(
        too_many,
        CheckoutError::Order(OrderError::Event(EventError::InsufficientInventory {
            requested: 3,
            available: 2,
            ..
        }))
    ));
    assert!(t.office.orders.orders_for_event(event.id).await.unwrap().is_empty());
    t.shutdown().await;
}

#[tokio::test]
async fn cancelling_pending_and_paid_orders() {
    let t = TestOffice::start();
    let host = t.organizer("Kemi").await;
    let buyer = t.attendee("Ada").await;
    let event = t.live_event(host, vec![regular(1000, 5)]).await;
    let ticket = event.ticket_types[0].id;
    let place = |n| {
        t.office
            .checkout
            .place_order(buyer, event.id, vec![TicketSelection::new(ticket, n)], None)
    };

    // Pending: nothing was settled, nothing moves back.
    let pending = place(2).await.unwrap();
    t.office.desk.cancel_order(host, pending.id).await.unwrap();
    let after_pending = t.office.events.fetch(event.id).await.unwrap();
    assert_eq!(after_pending.tickets_sold, 0);
    assert_eq!(after_pending.revenue, Decimal::ZERO);

    // Paid: seats come back exactly once.
    let paid = place(3).await.unwrap();
    t.office.checkout.pay(paid.id, CARD).await.unwrap();
    let cancelled = t.office.desk.cancel_order(host, paid.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert!(cancelled.cancelled_at.is_some());
    t.office.desk.cancel_order(host, paid.id).await.unwrap();

    let event = t.office.events.fetch(event.id).await.unwrap();
    assert_eq!(event.ticket_types[0].quantity_sold, 0);
    assert_eq!(event.tickets_sold, 0);
    assert_eq!(event.revenue, Decimal::ZERO);

    let err = t.office.checkout.pay(paid.id, CARD).await.unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::Order(OrderError::InvalidTransition { .. })
    ));
    t.shutdown().await;
}

#[tokio::test]
async fn discount_codes_respect_their_usage_limit() {
    let t = TestOffice::start();
    let host = t.organizer("Kemi").await;
    let buyer = t.attendee("Ada").await;
    let event = t.live_event(host, vec![regular(2000, 10)]).await;
    let ticket = event.ticket_types[0].id;
    t.office
        .desk
        .create_discount(host, "launch", DiscountKind::Fixed, Decimal::from(500), 1)
        .await
        .unwrap();

    let first = t
        .office
        .checkout
        .place_order(buyer, event.id, vec![TicketSelection::new(ticket, 1)], Some("LAUNCH"))
        .await
        .unwrap();
    assert_eq!(first.total, Decimal::from(1500));
    assert_eq!(first.discount.as_ref().unwrap().amount_off, Decimal::from(500));

    let place_again = || {
        t.office
            .checkout
            .place_order(buyer, event.id, vec![TicketSelection::new(ticket, 1)], Some("launch"))
    };
    let exhausted = place_again().await.unwrap_err();
    assert!(matches!(
        exhausted,
        CheckoutError::Order(OrderError::Discount(DiscountError::Exhausted { limit: 1, .. }))
    ));

    // Cancelling the first order gives the use back.
    t.office.desk.cancel_order(host, first.id).await.unwrap();
    let second = place_again().await.unwrap();
    assert_eq!(second.total, Decimal::from(1500));

    let unknown = t
        .office
        .checkout
        .place_order(buyer, event.id, vec![TicketSelection::new(ticket, 1)], Some("NOPE"))
        .await
        .unwrap_err();
    assert!(matches!(
        unknown,
        CheckoutError::Order(OrderError::Discount(DiscountError::UnknownCode(_)))
    ));
    t.shutdown().await;
}

#[tokio::test]
async fn declined_and_malformed_cards_leave_the_order_pending() {
    let t = TestOffice::start();
    let host = t.organizer("Kemi").await;
    let buyer = t.attendee("Ada").await;
    let event = t.live_event(host, vec![regular(3000, 10)]).await;
    let ticket = event.ticket_types[0].id;

    let order = t
        .office
        .checkout
        .place_order(buyer, event.id, vec![TicketSelection::new(ticket, 1)], None)
        .await
        .unwrap();

    let declined = t
        .office
        .checkout
        .pay(order.id, "4000 0000 0000 0002")
        .await
        .unwrap_err();
    assert_eq!(declined, CheckoutError::Payment(PaymentError::Declined));

    let malformed = t.office.checkout.pay(order.id, "not-a-card").await.unwrap_err();
    assert_eq!(malformed, CheckoutError::Payment(PaymentError::InvalidCard));

    let order = t.office.orders.fetch(order.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(t.gateway.charge_count(), 0);

    // A good card still works afterwards.
    let receipt = t.office.checkout.pay(order.id, CARD).await.unwrap();
    assert_eq!(receipt.order.status, OrderStatus::Paid);
    t.shutdown().await;
}

#[tokio::test]
async fn free_orders_skip_the_gateway() {
    let t = TestOffice::start();
    let host = t.organizer("Kemi").await;
    let buyer = t.attendee("Ada").await;
    let event = t
        .live_event(host, vec![TicketTypeDraft::free("Community", "NGN", 50)])
        .await;
    let ticket = event.ticket_types[0].id;

    let order = t
        .office
        .checkout
        .place_order(buyer, event.id, vec![TicketSelection::new(ticket, 2)], None)
        .await
        .unwrap();
    assert_eq!(order.total, Decimal::ZERO);

    let receipt = t.office.checkout.pay(order.id, "").await.unwrap();
    assert_eq!(receipt.payment_ref, format!("free_{}", order.id));
    assert_eq!(receipt.order.qr_tokens.len(), 2);
    assert_eq!(t.gateway.charge_count(), 0);

    let event = t.office.events.fetch(event.id).await.unwrap();
    assert_eq!(event.tickets_sold, 2);
    assert_eq!(event.revenue, Decimal::ZERO);
    t.shutdown().await;
}

#[tokio::test]
async fn unknown_buyer_cannot_place_orders() {
    let t = TestOffice::start();
    let host = t.organizer("Kemi").await;
    let event = t.live_event(host, vec![regular(1000, 2)]).await;
    let ticket = event.ticket_types[0].id;

    let err = t
        .office
        .checkout
        .place_order(
            box_office::model::UserId(999),
            event.id,
            vec![TicketSelection::new(ticket, 1)],
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::User(_)));
    t.shutdown().await;
}

#[tokio::test]
async fn my_orders_lists_only_the_buyers_own() {
    let t = TestOffice::start();
    let host = t.organizer("Kemi").await;
    let ada = t.attendee("Ada").await;
    let bayo = t.attendee("Bayo").await;
    let jazz = t.live_event(host, vec![regular(1000, 10)]).await;
    let comedy = t.live_event(host, vec![regular(400, 10)]).await;
    let order_for = |buyer, event: &box_office::model::Event, n| {
        t.office.checkout.place_order(
            buyer,
            event.id,
            vec![TicketSelection::new(event.ticket_types[0].id, n)],
            None,
        )
    };

    let first = order_for(ada, &jazz, 2).await.unwrap();
    t.clock.advance(Duration::minutes(1));
    order_for(bayo, &jazz, 1).await.unwrap();
    t.clock.advance(Duration::minutes(1));
    let second = order_for(ada, &comedy, 1).await.unwrap();
    t.office.checkout.pay(first.id, CARD).await.unwrap();

    let mine = t.office.checkout.my_orders(ada).await.unwrap();
    let ids: Vec<_> = mine.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert!(mine.iter().all(|o| o.buyer.user_id == ada));
    assert_eq!(mine[1].status, OrderStatus::Paid);
    assert_eq!(mine[1].qr_tokens.len(), 2);
    assert!(mine[0].qr_tokens.is_empty());

    assert_eq!(t.office.checkout.my_orders(bayo).await.unwrap().len(), 1);
    assert!(t.office.checkout.my_orders(host).await.unwrap().is_empty());
    assert!(matches!(
        t.office
            .checkout
            .my_orders(box_office::model::UserId(999))
            .await
            .unwrap_err(),
        CheckoutError::User(UserError::NotFound(_))
    ));
    t.shutdown().await;
}
