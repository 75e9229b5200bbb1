// Network observer: connections, link stats and traffic delta monitors

use crate::catalog::InterfaceCatalog;
use crate::classifier;
use crate::config::NetworkConfig;
use crate::error::Result;
use crate::models::{InterfaceConnections, InterfaceStats, TrafficDelta, TrafficSample};
use crate::monitor::{Monitor, Ticker, fetch};
use crate::projector;
use crate::provider::MetricsProvider;
use crate::sampler::DeltaSampler;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Per-stream tick periods. Each must be strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkIntervals {
    pub connections: Duration,
    pub stats: Duration,
    pub traffic: Duration,
}

impl From<&NetworkConfig> for NetworkIntervals {
    fn from(c: &NetworkConfig) -> Self {
        Self {
            connections: Duration::from_millis(c.connections_interval_ms),
            stats: Duration::from_millis(c.stats_interval_ms),
            traffic: Duration::from_millis(c.traffic_interval_ms),
        }
    }
}

/// Builds the interface catalog and the traffic baseline once, then hands
/// out independent monitors. Monitors share only the read-only catalog.
pub struct NetworkObserver {
    provider: Arc<dyn MetricsProvider>,
    catalog: InterfaceCatalog,
    baseline: TrafficSample,
    intervals: NetworkIntervals,
}

impl NetworkObserver {
    #[instrument(skip_all, fields(operation = "network_observer_new"))]
    pub async fn new(
        provider: Arc<dyn MetricsProvider>,
        intervals: NetworkIntervals,
    ) -> Result<Self> {
        let (catalog, baseline) = fetch(&provider, |p| {
            let catalog = InterfaceCatalog::build(p)?;
            let baseline = p.traffic_counters()?;
            Ok((catalog, baseline))
        })
        .await?;
        tracing::info!(
            interfaces = catalog.len(),
            ?intervals,
            "Network observer ready"
        );
        Ok(Self {
            provider,
            catalog,
            baseline,
            intervals,
        })
    }

    pub fn catalog(&self) -> &InterfaceCatalog {
        &self.catalog
    }

    pub fn intervals(&self) -> NetworkIntervals {
        self.intervals
    }

    pub fn connections_monitor(&self) -> ConnectionsMonitor {
        ConnectionsMonitor {
            provider: Arc::clone(&self.provider),
            catalog: self.catalog.clone(),
            ticker: Ticker::new(self.intervals.connections),
        }
    }

    pub fn stats_monitor(&self) -> StatsMonitor {
        StatsMonitor {
            provider: Arc::clone(&self.provider),
            catalog: self.catalog.clone(),
            ticker: Ticker::new(self.intervals.stats),
        }
    }

    /// Every monitor gets its own sampler seeded with the construction-time
    /// baseline, so its first tick already yields a delta.
    pub fn traffic_monitor(&self) -> TrafficMonitor {
        TrafficMonitor {
            provider: Arc::clone(&self.provider),
            sampler: DeltaSampler::with_baseline(self.intervals.traffic, self.baseline),
            ticker: Ticker::new(self.intervals.traffic),
        }
    }
}

pub struct ConnectionsMonitor {
    provider: Arc<dyn MetricsProvider>,
    catalog: InterfaceCatalog,
    ticker: Ticker,
}

impl Monitor for ConnectionsMonitor {
    type Item = Vec<InterfaceConnections>;

    async fn advance(&mut self) -> Result<Self::Item> {
        self.ticker.tick().await;
        let connections = fetch(&self.provider, |p| Ok(p.connections()?)).await?;
        let groups = classifier::classify(self.catalog.interfaces(), &connections);
        tracing::trace!(
            operation = "classify_connections",
            total = connections.len(),
            attributed = groups.iter().map(|g| g.connections.len()).sum::<usize>(),
            "Connections classified"
        );
        Ok(groups)
    }
}

pub struct StatsMonitor {
    provider: Arc<dyn MetricsProvider>,
    catalog: InterfaceCatalog,
    ticker: Ticker,
}

impl Monitor for StatsMonitor {
    type Item = Vec<InterfaceStats>;

    async fn advance(&mut self) -> Result<Self::Item> {
        self.ticker.tick().await;
        let raw = fetch(&self.provider, |p| Ok(p.link_stats()?)).await?;
        projector::project(self.catalog.interfaces(), &raw)
    }
}

/// Sole owner of its [`DeltaSampler`]; `&mut self` serializes updates.
pub struct TrafficMonitor {
    provider: Arc<dyn MetricsProvider>,
    sampler: DeltaSampler,
    ticker: Ticker,
}

impl TrafficMonitor {
    pub fn sampler(&self) -> &DeltaSampler {
        &self.sampler
    }
}

impl Monitor for TrafficMonitor {
    type Item = TrafficDelta;

    async fn advance(&mut self) -> Result<Self::Item> {
        loop {
            self.ticker.tick().await;
            let current = fetch(&self.provider, |p| Ok(p.traffic_counters()?)).await?;
            if let Some(delta) = self.sampler.sample(current) {
                return Ok(delta);
            }
        }
    }
}
