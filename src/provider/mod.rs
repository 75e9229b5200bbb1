// OS metrics provider capability and its sysinfo-backed implementation

mod linux;
mod system;

pub use system::SysinfoProvider;

use crate::error::ProviderError;
use crate::models::*;
use std::collections::HashMap;

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Point-in-time reads of host metrics. Calls may block; observers run them
/// on the blocking pool. Each call is treated as an internally consistent snapshot.
pub trait MetricsProvider: Send + Sync {
    /// Interface names in a stable order.
    fn interface_names(&self) -> ProviderResult<Vec<String>>;

    /// Bound address texts (IP and MAC) keyed by interface name.
    fn interface_addresses(&self) -> ProviderResult<HashMap<String, Vec<String>>>;

    /// System-wide connection table.
    fn connections(&self) -> ProviderResult<Vec<Connection>>;

    /// Link status keyed by interface name.
    fn link_stats(&self) -> ProviderResult<HashMap<String, RawLinkStats>>;

    /// Cumulative traffic counters summed over all interfaces.
    fn traffic_counters(&self) -> ProviderResult<TrafficSample>;

    /// `(physical, logical)` core counts. Physical is `None` when undeterminable.
    fn cpu_counts(&self) -> ProviderResult<(Option<usize>, usize)>;

    /// Global CPU utilization since the previous call, in percent.
    fn cpu_percent(&self) -> ProviderResult<f64>;

    fn cpu_times_percent(&self) -> ProviderResult<CpuTimesPercent>;

    fn cpu_stats(&self) -> ProviderResult<CpuCounters>;

    fn cpu_freq(&self) -> ProviderResult<CpuFreq>;

    fn disk_partitions(&self) -> ProviderResult<Vec<PartitionInfo>>;

    fn disk_usage(&self, partition: &PartitionInfo) -> ProviderResult<DiskUsage>;

    /// Aggregate disk I/O counters, `None` when the platform has none.
    fn disk_io_counters(&self) -> ProviderResult<Option<DiskIoCounters>>;
}
