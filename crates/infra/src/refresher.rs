//! Background worker that keeps restock suggestions fresh.
//!
//! Two independent triggers feed the same recompute:
//! - an interval tick (hourly by default),
//! - refresh requests raised by the service after item-affecting operations.
//!
//! Requests are coalesced with a trailing-edge debounce: a burst of requests
//! produces a single recompute once the burst has been quiet for `debounce`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use pantry_events::EventBus;
use pantry_inventory::PantryEvent;

use crate::config::PantryConfig;
use crate::notification::NotificationDispatcher;
use crate::repository::ItemRepository;
use crate::service::PantryService;

/// Handle to control a running refresher.
#[derive(Debug)]
pub struct RefresherHandle {
    shutdown: Arc<Notify>,
    join: Option<JoinHandle<()>>,
}

impl RefresherHandle {
    /// Request graceful shutdown and wait for the worker to stop.
    pub async fn shutdown(mut self) {
        self.shutdown.notify_one();
        if let Some(join) = self.join.take() {
            if let Err(e) = join.await {
                tracing::warn!("suggestion refresher ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for RefresherHandle {
    fn drop(&mut self) {
        if self.join.is_some() {
            self.shutdown.notify_one();
        }
    }
}

/// Debounced, periodic suggestion refresher.
pub struct SuggestionRefresher<R, N, B>
where
    R: ItemRepository,
    N: NotificationDispatcher,
    B: EventBus<PantryEvent>,
{
    service: Arc<PantryService<R, N, B>>,
    refresh_interval: Duration,
    debounce: Duration,
}

impl<R, N, B> SuggestionRefresher<R, N, B>
where
    R: ItemRepository + 'static,
    N: NotificationDispatcher + 'static,
    B: EventBus<PantryEvent> + 'static,
{
    /// Timings are taken from the service's configuration.
    pub fn new(service: Arc<PantryService<R, N, B>>) -> Self {
        let PantryConfig {
            refresh_interval,
            debounce,
            ..
        } = service.config().clone();

        Self {
            service,
            refresh_interval,
            debounce,
        }
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Spawn the worker on the current tokio runtime.
    ///
    /// From here on the service hands refresh requests to the worker instead of
    /// recomputing inline.
    pub fn start(self) -> RefresherHandle {
        let shutdown = Arc::new(Notify::new());
        let stop = shutdown.clone();
        let service = self.service;
        let refresh_interval = self.refresh_interval;
        let debounce = self.debounce;

        let signal = service.refresh_signal().clone();
        signal.attach();

        let join = tokio::spawn(async move {
            tracing::info!(
                "suggestion refresher started (interval={:?}, debounce={:?})",
                refresh_interval,
                debounce
            );

            // Initial suggestions were computed when the service started.
            let mut ticker = tokio::time::interval_at(Instant::now() + refresh_interval, refresh_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            'run: loop {
                tokio::select! {
                    _ = stop.notified() => break 'run,
                    _ = ticker.tick() => {
                        tracing::debug!("periodic suggestion refresh");
                        service.recompute_suggestions();
                    }
                    _ = signal.requested() => {
                        // Trailing edge: wait until requests stop arriving.
                        loop {
                            tokio::select! {
                                _ = stop.notified() => break 'run,
                                _ = signal.requested() => continue,
                                _ = tokio::time::sleep(debounce) => break,
                            }
                        }
                        tracing::debug!("debounced suggestion refresh");
                        service.recompute_suggestions();
                        ticker.reset();
                    }
                }
            }

            signal.detach();
            tracing::info!("suggestion refresher stopped");
        });

        RefresherHandle {
            shutdown,
            join: Some(join),
        }
    }
}
