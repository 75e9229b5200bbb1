// Hardware observer: CPU and disk utilization monitors

use crate::config::HardwareConfig;
use crate::error::Result;
use crate::models::{CpuStats, DiskPartitionStats, DiskStats};
use crate::monitor::{Monitor, Ticker, fetch};
use crate::provider::MetricsProvider;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareIntervals {
    pub cpu: Duration,
    pub disk: Duration,
}

impl From<&HardwareConfig> for HardwareIntervals {
    fn from(c: &HardwareConfig) -> Self {
        Self {
            cpu: Duration::from_millis(c.cpu_interval_ms),
            disk: Duration::from_millis(c.disk_interval_ms),
        }
    }
}

/// Captures core counts once; every tick otherwise reads fresh values and
/// passes them through unmodified.
pub struct HardwareObserver {
    provider: Arc<dyn MetricsProvider>,
    physical_count: Option<usize>,
    logical_count: usize,
    intervals: HardwareIntervals,
}

impl HardwareObserver {
    #[instrument(skip_all, fields(operation = "hardware_observer_new"))]
    pub async fn new(
        provider: Arc<dyn MetricsProvider>,
        intervals: HardwareIntervals,
    ) -> Result<Self> {
        let (physical_count, logical_count) = fetch(&provider, |p| Ok(p.cpu_counts()?)).await?;
        tracing::info!(
            physical_count = ?physical_count,
            logical_count,
            ?intervals,
            "Hardware observer ready"
        );
        Ok(Self {
            provider,
            physical_count,
            logical_count,
            intervals,
        })
    }

    pub fn physical_count(&self) -> Option<usize> {
        self.physical_count
    }

    pub fn logical_count(&self) -> usize {
        self.logical_count
    }

    pub fn cpu_monitor(&self) -> CpuMonitor {
        CpuMonitor {
            provider: Arc::clone(&self.provider),
            physical_count: self.physical_count,
            logical_count: self.logical_count,
            ticker: Ticker::new(self.intervals.cpu),
        }
    }

    pub fn disk_monitor(&self) -> DiskMonitor {
        DiskMonitor {
            provider: Arc::clone(&self.provider),
            ticker: Ticker::new(self.intervals.disk),
        }
    }
}

pub struct CpuMonitor {
    provider: Arc<dyn MetricsProvider>,
    physical_count: Option<usize>,
    logical_count: usize,
    ticker: Ticker,
}

impl Monitor for CpuMonitor {
    type Item = CpuStats;

    async fn advance(&mut self) -> Result<Self::Item> {
        self.ticker.tick().await;
        let (physical_count, logical_count) = (self.physical_count, self.logical_count);
        fetch(&self.provider, move |p| {
            Ok(CpuStats {
                physical_count,
                logical_count,
                percent: p.cpu_percent()?,
                stats: p.cpu_stats()?,
                times_percent: p.cpu_times_percent()?,
                freq: p.cpu_freq()?,
            })
        })
        .await
    }
}

pub struct DiskMonitor {
    provider: Arc<dyn MetricsProvider>,
    ticker: Ticker,
}

impl Monitor for DiskMonitor {
    type Item = DiskStats;

    async fn advance(&mut self) -> Result<Self::Item> {
        self.ticker.tick().await;
        fetch(&self.provider, |p| {
            let partitions = p
                .disk_partitions()?
                .into_iter()
                .map(|partition| {
                    let usage = p.disk_usage(&partition)?;
                    Ok(DiskPartitionStats { partition, usage })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(DiskStats {
                partitions,
                io: p.disk_io_counters()?,
            })
        })
        .await
    }
}
