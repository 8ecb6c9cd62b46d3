//! Background revalidation of a cache.
//!
//! A single task per cache reacts to three triggers:
//!
//! - the host regaining focus: refresh both collections
//! - the revalidation interval: refresh, but only while the host is visible
//! - the message poll: apply whatever other contexts posted
//!
//! The task runs until `RevalidationHandle::stop` is called or the handle
//! is dropped.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::{CatalogCache, CatalogSource, HostContext};

/// Timing and channel settings of a cache.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Period of the visible-only refresh.
    pub revalidate_every: Duration,
    /// How often the broadcast channel is drained.
    pub message_poll: Duration,
    /// Broadcast channel name shared by all contexts of one site. Used by
    /// `CatalogCache::with_queue`.
    pub channel_name: String,
    /// Load both collections as soon as the task starts.
    pub refresh_on_start: bool,
}

/// Shortest period either timer runs at. Zero periods are raised to this.
const MIN_PERIOD: Duration = Duration::from_millis(1);

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            revalidate_every: Duration::from_secs(60),
            message_poll: Duration::from_millis(50),
            channel_name: "catalog-data".to_string(),
            refresh_on_start: true,
        }
    }
}

fn non_zero(period: Duration, name: &str) -> Duration {
    if period.is_zero() {
        warn!(option = name, "zero period raised to {:?}", MIN_PERIOD);
        MIN_PERIOD
    } else {
        period
    }
}

/// Counters reported when the revalidation task stops.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RevalidationStats {
    pub focus_refreshes: usize,
    pub interval_refreshes: usize,
    /// Interval ticks skipped because the host was hidden.
    pub hidden_skips: usize,
    pub messages_handled: usize,
}

/// Owner of a running revalidation task.
pub struct RevalidationHandle {
    stop_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<RevalidationStats>>,
}

impl RevalidationHandle {
    /// Ask the task to stop without waiting for it.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Stop the task and wait for its final counters.
    ///
    /// A refresh that is already running completes first. Fails with the
    /// task's `JoinError` if it panicked.
    pub async fn stop(mut self) -> Result<RevalidationStats, JoinError> {
        self.signal_stop();
        match self.handle.take() {
            Some(handle) => handle.await.map_err(|err| {
                error!(error = %err, "cache revalidation task failed");
                err
            }),
            None => Ok(RevalidationStats::default()),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }
}

impl Drop for RevalidationHandle {
    fn drop(&mut self) {
        self.signal_stop();
    }
}

pub(crate) fn spawn<Src: CatalogSource>(
    cache: CatalogCache<Src>,
    host: HostContext,
    options: CacheOptions,
) -> RevalidationHandle {
    let (stop_tx, mut stop_rx) = watch::channel(false);
    let revalidate_every = non_zero(options.revalidate_every, "revalidate_every");
    let message_poll = non_zero(options.message_poll, "message_poll");

    let handle = tokio::spawn(async move {
        let mut stats = RevalidationStats::default();

        if options.refresh_on_start {
            cache.refresh_all().await;
        }

        let mut revalidate = interval_at(Instant::now() + revalidate_every, revalidate_every);
        revalidate.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut inbox = interval(message_poll);
        inbox.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            every_ms = revalidate_every.as_millis() as u64,
            channel = cache.channel_name().unwrap_or("none"),
            "cache revalidation started"
        );

        loop {
            tokio::select! {
                _ = stop_rx.changed() => break,
                _ = host.focused() => {
                    debug!("focus regained, refreshing");
                    cache.refresh_all().await;
                    stats.focus_refreshes += 1;
                }
                _ = revalidate.tick() => {
                    if host.is_visible() {
                        cache.refresh_all().await;
                        stats.interval_refreshes += 1;
                    } else {
                        stats.hidden_skips += 1;
                    }
                }
                _ = inbox.tick() => {
                    stats.messages_handled += cache.drain_messages().await;
                }
            }
        }

        info!(?stats, "cache revalidation stopped");
        stats
    });

    RevalidationHandle {
        stop_tx,
        handle: Some(handle),
    }
}
