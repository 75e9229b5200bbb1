// Shared test helpers: a scripted in-memory metrics provider

#![allow(dead_code)]

use hostwatch::error::ProviderError;
use hostwatch::models::*;
use hostwatch::provider::{MetricsProvider, ProviderResult};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Deterministic provider. Traffic samples are served in order; the last one
/// repeats once the script runs out. Fields can be changed between ticks.
#[derive(Default)]
pub struct FakeProvider {
    pub names: Mutex<Vec<String>>,
    pub addresses: Mutex<HashMap<String, Vec<String>>>,
    pub connections: Mutex<Vec<Connection>>,
    pub link_stats: Mutex<HashMap<String, RawLinkStats>>,
    pub traffic: Mutex<VecDeque<TrafficSample>>,
    pub last_traffic: Mutex<TrafficSample>,
    pub cpu_percent: Mutex<f64>,
    pub partitions: Mutex<Vec<(PartitionInfo, DiskUsage)>>,
    pub disk_io: Mutex<Option<DiskIoCounters>>,
    pub traffic_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interface(self, name: &str, addresses: &[&str]) -> Self {
        self.names.lock().unwrap().push(name.to_string());
        self.addresses.lock().unwrap().insert(
            name.to_string(),
            addresses.iter().map(|a| a.to_string()).collect(),
        );
        self.link_stats
            .lock()
            .unwrap()
            .insert(name.to_string(), link_up(1000));
        self
    }

    pub fn with_traffic(self, samples: &[TrafficSample]) -> Self {
        self.traffic.lock().unwrap().extend(samples.iter().copied());
        self
    }

    pub fn set_connections(&self, connections: Vec<Connection>) {
        *self.connections.lock().unwrap() = connections;
    }
}

impl MetricsProvider for FakeProvider {
    fn interface_names(&self) -> ProviderResult<Vec<String>> {
        Ok(self.names.lock().unwrap().clone())
    }

    fn interface_addresses(&self) -> ProviderResult<HashMap<String, Vec<String>>> {
        Ok(self.addresses.lock().unwrap().clone())
    }

    fn connections(&self) -> ProviderResult<Vec<Connection>> {
        Ok(self.connections.lock().unwrap().clone())
    }

    fn link_stats(&self) -> ProviderResult<HashMap<String, RawLinkStats>> {
        Ok(self.link_stats.lock().unwrap().clone())
    }

    fn traffic_counters(&self) -> ProviderResult<TrafficSample> {
        self.traffic_calls.fetch_add(1, Ordering::SeqCst);
        let mut last = self.last_traffic.lock().unwrap();
        if let Some(next) = self.traffic.lock().unwrap().pop_front() {
            *last = next;
        }
        Ok(*last)
    }

    fn cpu_counts(&self) -> ProviderResult<(Option<usize>, usize)> {
        Ok((Some(4), 8))
    }

    fn cpu_percent(&self) -> ProviderResult<f64> {
        Ok(*self.cpu_percent.lock().unwrap())
    }

    fn cpu_times_percent(&self) -> ProviderResult<CpuTimesPercent> {
        Ok(CpuTimesPercent {
            user: 10.0,
            idle: 90.0,
            ..Default::default()
        })
    }

    fn cpu_stats(&self) -> ProviderResult<CpuCounters> {
        Ok(CpuCounters {
            ctx_switches: 100,
            ..Default::default()
        })
    }

    fn cpu_freq(&self) -> ProviderResult<CpuFreq> {
        Ok(CpuFreq {
            current: 2400.0,
            min: 800.0,
            max: 3600.0,
        })
    }

    fn disk_partitions(&self) -> ProviderResult<Vec<PartitionInfo>> {
        Ok(self
            .partitions
            .lock()
            .unwrap()
            .iter()
            .map(|(p, _)| p.clone())
            .collect())
    }

    fn disk_usage(&self, partition: &PartitionInfo) -> ProviderResult<DiskUsage> {
        self.partitions
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| p.mountpoint == partition.mountpoint)
            .map(|(_, u)| *u)
            .ok_or_else(|| ProviderError::Unavailable(partition.mountpoint.clone()))
    }

    fn disk_io_counters(&self) -> ProviderResult<Option<DiskIoCounters>> {
        Ok(*self.disk_io.lock().unwrap())
    }
}

pub fn link_up(speed_mbps: u64) -> RawLinkStats {
    RawLinkStats {
        is_up: true,
        duplex: Duplex::Full,
        speed_mbps,
        mtu: 1500,
        flags: "up,broadcast,running,multicast".into(),
    }
}

pub fn tcp(local: &str, port: u16) -> Connection {
    Connection {
        family: if local.contains(':') {
            SocketFamily::Inet6
        } else {
            SocketFamily::Inet
        },
        kind: SocketKind::Tcp,
        local_address: local.to_string(),
        local_port: port,
        remote: None,
        status: "LISTEN".into(),
        pid: Some(42),
    }
}

pub fn sent(bytes: u64) -> TrafficSample {
    TrafficSample {
        sent_bytes: bytes,
        ..Default::default()
    }
}
