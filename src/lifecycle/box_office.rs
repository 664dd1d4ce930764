use super::sweeper::StatusSweeper;
use crate::catalog::Catalog;
use crate::checkout::Checkout;
use crate::clients::{DiscountClient, EventClient, OrderClient, UserClient};
use crate::clock::Clock;
use crate::config::Config;
use crate::organizer::OrganizerDesk;
use crate::payment::PaymentGateway;
use actor_framework::RetryPolicy;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("{task} task failed: {reason}")]
    TaskFailed { task: &'static str, reason: String },

    #[error("Shutdown did not finish within {0:?}")]
    ShutdownTimeout(Duration),
}

impl SystemError {
    pub fn is_transient(&self) -> bool {
        false
    }
}

/// The running system: four actors, the status sweeper, and the services
/// built on their clients.
///
/// ```rust
/// use box_office::clock::SystemClock;
/// use box_office::config::Config;
/// use box_office::lifecycle::BoxOffice;
/// use box_office::payment::SimulatedGateway;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let office = BoxOffice::start(
///         Config::default(),
///         Arc::new(SystemClock),
///         Arc::new(SimulatedGateway::default()),
///     );
///     assert!(office.catalog.live_events().await?.is_empty());
///     office.shutdown().await?;
///     Ok(())
/// }
/// ```
pub struct BoxOffice {
    pub users: UserClient,
    pub events: EventClient,
    pub discounts: DiscountClient,
    pub orders: OrderClient,
    pub catalog: Catalog,
    pub checkout: Checkout,
    pub desk: OrganizerDesk,
    sweeper: StatusSweeperHandle,
    handles: Vec<(&'static str, JoinHandle<()>)>,
    shutdown_timeout: Duration,
}

struct StatusSweeperHandle {
    sweeper: Arc<StatusSweeper>,
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl BoxOffice {
    /// Spawn the actors and the sweeper. Must be called inside a Tokio
    /// runtime.
    pub fn start(
        config: Config,
        clock: Arc<dyn Clock>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let capacity = config.channel_capacity;

        // 1. Create actors; contexts are injected at run time
        let (user_actor, users) = crate::user_actor::new(capacity);
        let (event_actor, events) = crate::event_actor::new(capacity);
        let (discount_actor, discounts) = crate::discount_actor::new(capacity);
        let (order_actor, orders) = crate::order_actor::new(capacity);

        // 2. Start them. Only orders depend on other actors.
        let handles = vec![
            ("order", tokio::spawn(order_actor.run((events.clone(), discounts.clone())))),
            ("user", tokio::spawn(user_actor.run(()))),
            ("event", tokio::spawn(event_actor.run(()))),
            ("discount", tokio::spawn(discount_actor.run(()))),
        ];

        // 3. Sweeper and services
        let (sweeper, stop) =
            StatusSweeper::new(events.clone(), clock.clone(), config.sweep_interval);
        let sweeper = Arc::new(sweeper);
        let handle = {
            let sweeper = Arc::clone(&sweeper);
            tokio::spawn(async move { sweeper.run().await })
        };

        let retry = RetryPolicy::builder()
            .max_retries(config.confirm_retries as usize)
            .build();
        let catalog = Catalog::new(events.clone(), clock.clone());
        let checkout = Checkout::new(orders.clone(), users.clone(), gateway, clock.clone(), retry);
        let desk = OrganizerDesk::new(
            users.clone(),
            events.clone(),
            discounts.clone(),
            orders.clone(),
            clock,
            &config.default_currency,
        );

        info!(capacity, "Box office started");
        Self {
            users,
            events,
            discounts,
            orders,
            catalog,
            checkout,
            desk,
            sweeper: StatusSweeperHandle {
                sweeper,
                stop,
                handle,
            },
            handles,
            shutdown_timeout: config.shutdown_timeout,
        }
    }

    /// The running sweeper, for an immediate [`StatusSweeper::sweep_once`].
    pub fn sweeper(&self) -> &StatusSweeper {
        &self.sweeper.sweeper
    }

    /// Stop the sweeper, drop every client and wait for the actors to drain.
    ///
    /// Clients cloned out of the box office (an [`OrderWatch`] included) keep
    /// their actor alive; if any are still held, this returns
    /// [`SystemError::ShutdownTimeout`].
    ///
    /// [`OrderWatch`]: crate::clients::OrderWatch
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down box office...");
        let Self {
            users,
            events,
            discounts,
            orders,
            catalog,
            checkout,
            desk,
            sweeper,
            handles,
            shutdown_timeout,
        } = self;

        // Step 1: stop the sweeper, which holds an event client
        let _ = sweeper.stop.send(true);
        drop(sweeper.sweeper);
        sweeper
            .handle
            .await
            .map_err(|e| failed("sweeper", e))?;

        // Step 2: close the channels
        drop((catalog, checkout, desk));
        drop((users, events, discounts, orders));

        // Step 3: wait, order actor first since it holds event and discount
        // clients in its context
        let drain = async {
            for (task, handle) in handles {
                handle.await.map_err(|e| failed(task, e))?;
            }
            Ok::<(), SystemError>(())
        };
        match tokio::time::timeout(shutdown_timeout, drain).await {
            Ok(result) => {
                if result.is_ok() {
                    info!("Box office shutdown complete.");
                }
                result
            }
            Err(_) => {
                error!(timeout = ?shutdown_timeout, "Actors still running after shutdown timeout");
                Err(SystemError::ShutdownTimeout(shutdown_timeout))
            }
        }
    }
}

fn failed(task: &'static str, e: tokio::task::JoinError) -> SystemError {
    error!(task, error = ?e, "Task failed");
    SystemError::TaskFailed {
        task,
        reason: e.to_string(),
    }
}
