// Periodic monitors: tick clock, single-step advance, stream adapter

use crate::error::{ObserverError, Result};
use crate::provider::MetricsProvider;
use futures_util::Stream;
use std::future::Future;
use std::sync::Arc;
use tokio::time::{Duration, Instant, Interval, MissedTickBehavior, interval_at};

/// An unbounded periodic metric stream. Each `advance` waits for the next
/// tick, then fetches and transforms one snapshot. A failed tick does not
/// end the monitor; the next `advance` starts a fresh tick.
pub trait Monitor: Send + Sized + 'static {
    type Item: Send + 'static;

    fn advance(&mut self) -> impl Future<Output = Result<Self::Item>> + Send;

    /// Infinite stream of tick results. Dropping the stream stops sampling.
    fn into_stream(self) -> impl Stream<Item = Result<Self::Item>> + Send {
        futures_util::stream::unfold(self, |mut monitor| async move {
            let item = monitor.advance().await;
            Some((item, monitor))
        })
    }
}

/// Fires once per period; the first tick is one full period after creation.
#[derive(Debug)]
pub struct Ticker {
    interval: Interval,
    period: Duration,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval, period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }
}

/// Runs a provider query on the blocking pool.
pub(crate) async fn fetch<T, F>(provider: &Arc<dyn MetricsProvider>, query: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn MetricsProvider) -> Result<T> + Send + 'static,
{
    let provider = Arc::clone(provider);
    tokio::task::spawn_blocking(move || query(provider.as_ref()))
        .await
        .map_err(|e| ObserverError::Task(e.to_string()))?
}
