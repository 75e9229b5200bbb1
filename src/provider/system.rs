// Host metrics via sysinfo, with Linux procfs/sysfs for the rest

use super::{MetricsProvider, ProviderResult, linux};
use crate::error::ProviderError;
use crate::models::*;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use sysinfo::{Disks, Networks, System};
use tracing::instrument;

/// Link stats for interfaces whose sysfs entries are missing: down, no
/// flags, unknown duplex, zero speed and mtu.
fn unknown_link_stats<'a>(
    names: impl IntoIterator<Item = &'a String>,
) -> HashMap<String, RawLinkStats> {
    names
        .into_iter()
        .map(|name| {
            (
                name.clone(),
                RawLinkStats {
                    is_up: false,
                    duplex: Duplex::Unknown,
                    speed_mbps: 0,
                    mtu: 0,
                    flags: String::new(),
                },
            )
        })
        .collect()
}

fn lock<'a, T>(m: &'a Mutex<T>, what: &str) -> ProviderResult<MutexGuard<'a, T>> {
    m.lock()
        .map_err(|e| ProviderError::Lock(format!("{}: {}", what, e)))
}

/// Production provider. sysinfo handles are refreshed in place on every call,
/// so CPU usage is measured between consecutive `cpu_percent` calls.
pub struct SysinfoProvider {
    sys: Mutex<System>,
    disks: Mutex<Disks>,
    networks: Mutex<Networks>,
    last_cpu_times: Mutex<Option<linux::CpuTimes>>,
}

impl Default for SysinfoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoProvider {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        let last_cpu_times = linux::read_proc_stat()
            .as_deref()
            .and_then(linux::parse_cpu_times);
        Self {
            sys: Mutex::new(sys),
            disks: Mutex::new(Disks::new_with_refreshed_list()),
            networks: Mutex::new(Networks::new_with_refreshed_list()),
            last_cpu_times: Mutex::new(last_cpu_times),
        }
    }
}

impl MetricsProvider for SysinfoProvider {
    #[instrument(skip(self), fields(provider = "sysinfo", operation = "interface_names"))]
    fn interface_names(&self) -> ProviderResult<Vec<String>> {
        let mut networks = lock(&self.networks, "networks")?;
        networks.refresh(true);
        let mut names: Vec<String> = networks.list().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "interface_addresses"))]
    fn interface_addresses(&self) -> ProviderResult<HashMap<String, Vec<String>>> {
        let mut networks = lock(&self.networks, "networks")?;
        networks.refresh(true);
        Ok(networks
            .list()
            .iter()
            .map(|(name, data)| {
                let ips = data.ip_networks();
                let mut addresses: Vec<String> = ips
                    .iter()
                    .filter(|n| n.addr.is_ipv4())
                    .chain(ips.iter().filter(|n| n.addr.is_ipv6()))
                    .map(|n| n.addr.to_string())
                    .collect();
                addresses.push(data.mac_address().to_string());
                (name.clone(), addresses)
            })
            .collect())
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "connections"))]
    fn connections(&self) -> ProviderResult<Vec<Connection>> {
        Ok(linux::read_connections()?)
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "link_stats"))]
    fn link_stats(&self) -> ProviderResult<HashMap<String, RawLinkStats>> {
        let stats = linux::read_link_stats();
        if !stats.is_empty() {
            return Ok(stats);
        }
        let networks = lock(&self.networks, "networks")?;
        Ok(unknown_link_stats(networks.list().keys()))
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "traffic_counters"))]
    fn traffic_counters(&self) -> ProviderResult<TrafficSample> {
        if let Some(sample) = linux::read_net_dev() {
            return Ok(sample);
        }
        let mut networks = lock(&self.networks, "networks")?;
        networks.refresh(true);
        Ok(networks
            .list()
            .values()
            .fold(TrafficSample::default(), |mut acc, data| {
                acc.sent_bytes = acc.sent_bytes.wrapping_add(data.total_transmitted());
                acc.recv_bytes = acc.recv_bytes.wrapping_add(data.total_received());
                acc.packets_sent = acc
                    .packets_sent
                    .wrapping_add(data.total_packets_transmitted());
                acc.packets_recv = acc
                    .packets_recv
                    .wrapping_add(data.total_packets_received());
                acc.err_in = acc.err_in.wrapping_add(data.total_errors_on_received());
                acc.err_out = acc.err_out.wrapping_add(data.total_errors_on_transmitted());
                acc
            }))
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "cpu_counts"))]
    fn cpu_counts(&self) -> ProviderResult<(Option<usize>, usize)> {
        let sys = lock(&self.sys, "sysinfo")?;
        Ok((System::physical_core_count(), sys.cpus().len()))
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "cpu_percent"))]
    fn cpu_percent(&self) -> ProviderResult<f64> {
        let mut sys = lock(&self.sys, "sysinfo")?;
        sys.refresh_cpu_all();
        Ok(sys.global_cpu_usage() as f64)
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "cpu_times_percent"))]
    fn cpu_times_percent(&self) -> ProviderResult<CpuTimesPercent> {
        let Some(current) = linux::read_proc_stat()
            .as_deref()
            .and_then(linux::parse_cpu_times)
        else {
            return Ok(CpuTimesPercent::default());
        };
        let mut last = lock(&self.last_cpu_times, "cpu times")?;
        let percent = match last.as_ref() {
            Some(previous) => current.percent_since(previous),
            None => current.percent_since(&linux::CpuTimes::default()),
        };
        *last = Some(current);
        Ok(percent)
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "cpu_stats"))]
    fn cpu_stats(&self) -> ProviderResult<CpuCounters> {
        Ok(linux::read_proc_stat()
            .map(|stat| linux::parse_cpu_counters(&stat))
            .unwrap_or_default())
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "cpu_freq"))]
    fn cpu_freq(&self) -> ProviderResult<CpuFreq> {
        let mut sys = lock(&self.sys, "sysinfo")?;
        sys.refresh_cpu_frequency();
        let cpus = sys.cpus();
        let current = if cpus.is_empty() {
            0.0
        } else {
            cpus.iter().map(|c| c.frequency() as f64).sum::<f64>() / cpus.len() as f64
        };
        let (min, max) = linux::read_cpu_freq_bounds().unwrap_or((0.0, 0.0));
        Ok(CpuFreq { current, min, max })
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "disk_partitions"))]
    fn disk_partitions(&self) -> ProviderResult<Vec<PartitionInfo>> {
        let mut disks = lock(&self.disks, "disks")?;
        disks.refresh(true);
        Ok(disks
            .list()
            .iter()
            .map(|d| PartitionInfo {
                device: d.name().to_string_lossy().into_owned(),
                mountpoint: d.mount_point().to_string_lossy().into_owned(),
                fstype: d.file_system().to_string_lossy().into_owned(),
                removable: d.is_removable(),
            })
            .collect())
    }

    #[instrument(skip(self, partition), fields(provider = "sysinfo", operation = "disk_usage", mountpoint = %partition.mountpoint))]
    fn disk_usage(&self, partition: &PartitionInfo) -> ProviderResult<DiskUsage> {
        let disks = lock(&self.disks, "disks")?;
        let disk = disks
            .list()
            .iter()
            .find(|d| d.mount_point().to_string_lossy() == partition.mountpoint)
            .ok_or_else(|| {
                ProviderError::Unavailable(format!("no disk mounted at {}", partition.mountpoint))
            })?;
        let total = disk.total_space();
        let free = disk.available_space();
        let used = total.saturating_sub(free);
        let percent = if total > 0 {
            (used as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        Ok(DiskUsage {
            total,
            used,
            free,
            percent,
        })
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "disk_io_counters"))]
    fn disk_io_counters(&self) -> ProviderResult<Option<DiskIoCounters>> {
        Ok(linux::read_disk_io())
    }
}
