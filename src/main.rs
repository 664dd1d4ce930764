//! Scripted walk through the box office: an organizer publishes an event and
//! a discount code, an attendee buys with it, pays twice, and gets in. The
//! organizer's dashboard is printed as JSON at the end.

use actor_framework::tracing::setup_tracing;
use box_office::analytics::EventFilter;
use box_office::clock::{Clock, SystemClock};
use box_office::config::Config;
use box_office::lifecycle::BoxOffice;
use box_office::model::{
    DiscountKind, EventCreate, TicketSelection, TicketTypeDraft, UserCreate, UserId,
};
use box_office::payment::SimulatedGateway;
use chrono::Duration;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let config = Config::from_env()?;
    info!(?config, "Starting box office demo");

    let clock = Arc::new(SystemClock);
    let gateway = Arc::new(SimulatedGateway::new(config.payment_delay));
    let office = BoxOffice::start(config, clock.clone(), gateway);

    // People
    let organizer = office
        .users
        .register(UserCreate {
            name: "Tolu Adebayo".into(),
            email: "tolu@lagoslive.example".into(),
            phone: None,
            created_at: clock.now(),
        })
        .await?;
    office
        .users
        .become_organizer(organizer, "Lagos Live")
        .await?;
    let attendee = office
        .users
        .register(UserCreate {
            name: "Ada Obi".into(),
            email: "ada@example.com".into(),
            phone: Some("+234 800 000 0000".into()),
            created_at: clock.now(),
        })
        .await?;

    // Event and discount
    let span = tracing::info_span!("organizer_setup");
    let event = async {
        let start = clock.now() + Duration::days(14);
        office
            .desk
            .create_event(
                organizer,
                EventCreate {
                    organizer_id: UserId(0),
                    title: "Afrobeats on the Lagoon".into(),
                    description: "An evening of live music by the water.".into(),
                    images: vec!["https://img.example/lagoon.jpg".into()],
                    location: "Lekki, Lagos".into(),
                    is_online: false,
                    start,
                    end: Some(start + Duration::hours(5)),
                    ticket_types: vec![
                        TicketTypeDraft::paid("Regular", Decimal::from(5000), "", 200),
                        TicketTypeDraft::paid("VIP", Decimal::from(20000), "", 20),
                    ],
                    publish: true,
                    created_at: clock.now(),
                },
            )
            .await
    }
    .instrument(span)
    .await?;
    info!(event_id = %event.id, status = %event.status, "Event published");

    office
        .desk
        .create_discount(organizer, "EARLYBIRD", DiscountKind::Percentage, Decimal::from(10), 50)
        .await?;

    // Shopping
    let page = office.catalog.event_page(event.id).await?;
    let regular = page.seats[0].ticket_type;
    let vip = page.seats[1].ticket_type;

    let span = tracing::info_span!("checkout");
    let (order, receipt) = async {
        let order = office
            .checkout
            .place_order(
                attendee,
                event.id,
                vec![TicketSelection::new(regular, 2), TicketSelection::new(vip, 1)],
                Some("earlybird"),
            )
            .await?;
        info!(order_id = %order.id, subtotal = %order.subtotal, total = %order.total, "Order placed");

        let receipt = office.checkout.pay(order.id, "4242 4242 4242 4242").await?;
        let replay = office.checkout.pay(order.id, "4242 4242 4242 4242").await?;
        info!(
            payment_ref = %receipt.payment_ref,
            replayed = replay.replayed,
            "Payment confirmed"
        );
        Ok::<_, box_office::checkout::CheckoutError>((order, receipt))
    }
    .instrument(span)
    .await?;

    // At the door
    if let Some(seat) = receipt.order.qr_tokens.first() {
        let scanned = office.desk.scan_token(organizer, &seat.token).await?;
        info!(order_id = %order.id, status = %scanned.status, "Seat checked in");
    }

    let dashboard = office.desk.dashboard(organizer, EventFilter::All).await?;
    println!("{}", serde_json::to_string_pretty(&dashboard)?);

    office.shutdown().await?;
    info!("Demo completed successfully");
    Ok(())
}
