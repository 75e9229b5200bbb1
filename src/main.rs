use anyhow::Result;
use hostwatch::error::ObserverError;
use hostwatch::models::*;
use hostwatch::observer::{HardwareObserver, NetworkObserver};
use hostwatch::provider::{MetricsProvider, SysinfoProvider};
use hostwatch::worker::{StreamCounters, shutdown_channel, spawn_monitor};
use hostwatch::*;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

type Rx<T> = mpsc::Receiver<std::result::Result<T, ObserverError>>;

fn log_connections(groups: &[InterfaceConnections]) {
    for group in groups.iter().filter(|g| !g.connections.is_empty()) {
        for by_addr in group.by_address() {
            for conn in by_addr.connections {
                tracing::info!(
                    interface = %group.interface.name,
                    address = %by_addr.address.raw_text(),
                    status = %conn.status,
                    pid = ?conn.pid,
                    local_port = conn.local_port,
                    remote = ?conn.remote.as_ref().map(|r| format!("{}:{}", r.address, r.port)),
                    "connection"
                );
            }
        }
    }
}

fn log_stats(stats: &[InterfaceStats]) {
    for s in stats {
        tracing::info!(
            interface = %s.interface.name,
            is_up = s.is_up,
            duplex = ?s.duplex,
            speed_mbps = s.speed_mbps,
            mtu = s.mtu,
            flags = %s.flags,
            "link"
        );
    }
}

fn log_traffic(delta: &TrafficDelta) {
    let rates = delta.rates();
    tracing::info!(
        sent_bytes = delta.sent_bytes,
        recv_bytes = delta.recv_bytes,
        sent_bytes_per_sec = rates.sent_bytes_per_sec,
        recv_bytes_per_sec = rates.recv_bytes_per_sec,
        err_in = delta.err_in,
        err_out = delta.err_out,
        drop_in = delta.drop_in,
        drop_out = delta.drop_out,
        interval_s = delta.interval_s,
        "traffic"
    );
}

fn log_cpu(cpu: &CpuStats) {
    tracing::info!(
        percent = cpu.percent,
        physical = ?cpu.physical_count,
        logical = cpu.logical_count,
        freq_mhz = cpu.freq.current,
        ctx_switches = cpu.stats.ctx_switches,
        "cpu"
    );
}

fn log_disk(disk: &DiskStats) {
    for p in &disk.partitions {
        tracing::info!(
            mountpoint = %p.partition.mountpoint,
            device = %p.partition.device,
            percent = p.usage.percent,
            "disk"
        );
    }
    if let Some(io) = &disk.io {
        tracing::info!(
            read_bytes = io.read_bytes,
            write_bytes = io.write_bytes,
            "disk io"
        );
    }
}

fn handle<T: serde::Serialize>(
    stream: &str,
    item: std::result::Result<T, ObserverError>,
    log: impl Fn(&T),
) {
    match item {
        Ok(value) => {
            log(&value);
            if tracing::enabled!(tracing::Level::DEBUG) {
                match serde_json::to_string(&value) {
                    Ok(json) => tracing::debug!(stream, record = %json, "record"),
                    Err(e) => tracing::debug!(stream, error = %e, "record not serializable"),
                }
            }
        }
        Err(e) => tracing::warn!(stream, error = %e, "metric temporarily unavailable"),
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    tracing::info!(version = %version::banner(), "Starting");
    let app_config = config::AppConfig::load()?;
    let capacity = app_config.publishing.channel_capacity;

    let provider: Arc<dyn MetricsProvider> = Arc::new(SysinfoProvider::new());
    let network = NetworkObserver::new(provider.clone(), (&app_config.network).into())
        .await
        .map_err(|e| anyhow::anyhow!("network observer: {}", e))?;
    let hardware = HardwareObserver::new(provider, (&app_config.hardware).into())
        .await
        .map_err(|e| anyhow::anyhow!("hardware observer: {}", e))?;

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let counters: [Arc<StreamCounters>; 5] = Default::default();

    let (conn_tx, mut conn_rx): (_, Rx<Vec<InterfaceConnections>>) = mpsc::channel(capacity);
    let (stats_tx, mut stats_rx): (_, Rx<Vec<InterfaceStats>>) = mpsc::channel(capacity);
    let (traffic_tx, mut traffic_rx): (_, Rx<TrafficDelta>) = mpsc::channel(capacity);
    let (cpu_tx, mut cpu_rx): (_, Rx<CpuStats>) = mpsc::channel(capacity);
    let (disk_tx, mut disk_rx): (_, Rx<DiskStats>) = mpsc::channel(capacity);

    let handles = vec![
        spawn_monitor(
            "connections",
            network.connections_monitor(),
            conn_tx,
            shutdown_rx.clone(),
            counters[0].clone(),
        ),
        spawn_monitor(
            "stats",
            network.stats_monitor(),
            stats_tx,
            shutdown_rx.clone(),
            counters[1].clone(),
        ),
        spawn_monitor(
            "traffic",
            network.traffic_monitor(),
            traffic_tx,
            shutdown_rx.clone(),
            counters[2].clone(),
        ),
        spawn_monitor(
            "cpu",
            hardware.cpu_monitor(),
            cpu_tx,
            shutdown_rx.clone(),
            counters[3].clone(),
        ),
        spawn_monitor(
            "disk",
            hardware.disk_monitor(),
            disk_tx,
            shutdown_rx,
            counters[4].clone(),
        ),
    ];

    let mut summary_tick = interval(Duration::from_secs(
        app_config.logging.summary_interval_secs,
    ));
    summary_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some(item) = conn_rx.recv() => handle("connections", item, |g| log_connections(g)),
            Some(item) = stats_rx.recv() => handle("stats", item, |s| log_stats(s)),
            Some(item) = traffic_rx.recv() => handle("traffic", item, log_traffic),
            Some(item) = cpu_rx.recv() => handle("cpu", item, log_cpu),
            Some(item) = disk_rx.recv() => handle("disk", item, log_disk),
            _ = summary_tick.tick() => {
                let names = ["connections", "stats", "traffic", "cpu", "disk"];
                for (name, c) in names.iter().zip(counters.iter()) {
                    tracing::info!(
                        stream = name,
                        records = c.records(),
                        failures = c.failures(),
                        "stream stats"
                    );
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Received shutdown signal");
                let _ = shutdown_tx.send(true);
                break;
            }
        }
    }

    drop((conn_rx, stats_rx, traffic_rx, cpu_rx, disk_rx));
    for handle in handles {
        let _ = handle.await;
    }
    Ok(())
}
