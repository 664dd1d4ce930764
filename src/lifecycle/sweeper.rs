//! Moves live events past their end to `Ended`.
//!
//! The transition is explicit and idempotent: the event actor's `SyncStatus`
//! only ever goes `Live -> Ended`, so running a sweep twice, or concurrently
//! with the dashboard's own sync, changes nothing the second time.

use crate::clients::EventClient;
use crate::clock::Clock;
use crate::event_actor::EventError;
use crate::model::{Event, EventId, EventStatus};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub struct StatusSweeper {
    events: EventClient,
    clock: Arc<dyn Clock>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl StatusSweeper {
    /// The sweeper and the sender that stops it (`send(true)`, or drop it).
    pub fn new(
        events: EventClient,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> (Self, watch::Sender<bool>) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let sweeper = Self {
            events,
            clock,
            interval,
            shutdown: shutdown_rx,
        };
        (sweeper, shutdown_tx)
    }

    /// End every live event whose effective end is before `now`. Returns the
    /// ids that changed.
    pub async fn sweep_once(&self, now: DateTime<Utc>) -> Result<Vec<EventId>, EventError> {
        let due = self
            .events
            .list_where(move |e: &Event| e.status == EventStatus::Live && e.has_ended_at(now))
            .await?;

        let mut ended = Vec::new();
        for event in due {
            match self.events.sync_status(event.id, now).await {
                Ok(true) => ended.push(event.id),
                Ok(false) => {}
                Err(err) if err.is_transient() => return Err(err),
                // Closed by its organizer since the listing, or gone.
                Err(err) => warn!(event_id = %event.id, error = %err, "Skipping event"),
            }
        }
        if !ended.is_empty() {
            info!(count = ended.len(), "Events ended");
        }
        Ok(ended)
    }

    /// Sweep on every tick until shut down. The first sweep runs at once.
    pub async fn run(&self) {
        let mut shutdown = self.shutdown.clone();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(interval = ?self.interval, "Status sweeper started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let now = self.clock.now();
                    if let Err(err) = self.sweep_once(now).await {
                        warn!(error = %err, "Status sweep failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    debug!("Ignoring shutdown signal reset");
                }
            }
        }
        info!("Status sweeper stopped");
    }
}
