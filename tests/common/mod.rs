//! Shared fixtures: a full box office on a manual clock.

#![allow(dead_code)]

use box_office::clock::ManualClock;
use box_office::config::Config;
use box_office::lifecycle::BoxOffice;
use box_office::model::{Event, EventCreate, TicketTypeDraft, UserCreate, UserId};
use box_office::payment::SimulatedGateway;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

pub const CARD: &str = "4242 4242 4242 4242";

pub fn opening_day() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap()
}

pub struct TestOffice {
    pub office: BoxOffice,
    pub clock: ManualClock,
    pub gateway: Arc<SimulatedGateway>,
}

impl TestOffice {
    pub fn start() -> Self {
        let clock = ManualClock::new(opening_day());
        let gateway = Arc::new(SimulatedGateway::default());
        let config = Config {
            // Tests drive the sweeper by hand.
            sweep_interval: std::time::Duration::from_secs(3600),
            ..Config::default()
        };
        let office = BoxOffice::start(config, Arc::new(clock.clone()), gateway.clone());
        Self {
            office,
            clock,
            gateway,
        }
    }

    pub async fn attendee(&self, name: &str) -> UserId {
        self.office
            .users
            .register(UserCreate {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                phone: None,
                created_at: opening_day(),
            })
            .await
            .expect("Failed to register attendee")
    }

    pub async fn organizer(&self, name: &str) -> UserId {
        let id = self.attendee(name).await;
        self.office
            .users
            .become_organizer(id, &format!("{name} Presents"))
            .await
            .expect("Failed to promote organizer");
        id
    }

    /// A live event a week out with the given ticket types.
    pub async fn live_event(&self, organizer: UserId, tickets: Vec<TicketTypeDraft>) -> Event {
        let start = opening_day() + Duration::days(7);
        self.event_at(organizer, "Harbour Jazz", start, Some(start + Duration::hours(4)), tickets)
            .await
    }

    pub async fn event_at(
        &self,
        organizer: UserId,
        title: &str,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        tickets: Vec<TicketTypeDraft>,
    ) -> Event {
        self.office
            .desk
            .create_event(
                organizer,
                EventCreate {
                    organizer_id: organizer,
                    title: title.to_string(),
                    description: "Live music".into(),
                    images: Vec::new(),
                    location: "Victoria Island".into(),
                    is_online: false,
                    start,
                    end,
                    ticket_types: tickets,
                    publish: true,
                    created_at: opening_day(),
                },
            )
            .await
            .expect("Failed to create event")
    }

    pub async fn shutdown(self) {
        self.office.shutdown().await.expect("Shutdown failed");
    }
}

pub fn regular(price: i64, total: u32) -> TicketTypeDraft {
    TicketTypeDraft::paid("Regular", Decimal::from(price), "NGN", total)
}
