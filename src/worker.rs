// Background monitor tasks: one tokio task per stream, feeding a bounded channel.
// Shutdown is cooperative: a task stops between ticks, never inside a fetch.

use crate::error::Result;
use crate::monitor::Monitor;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Per-stream counters shared with whoever logs them.
#[derive(Debug, Default)]
pub struct StreamCounters {
    pub records: AtomicU64,
    pub failures: AtomicU64,
}

impl StreamCounters {
    pub fn records(&self) -> u64 {
        self.records.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

/// Creates the shutdown pair handed to every worker. Send `true` to stop.
pub fn shutdown_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Spawns the task that drives `monitor` and forwards each tick result to `tx`.
/// Failed ticks are logged and forwarded; the consumer decides what to do.
/// Exits when shutdown is signalled or the receiver is dropped.
pub fn spawn_monitor<M: Monitor>(
    name: &'static str,
    mut monitor: M,
    tx: mpsc::Sender<Result<M::Item>>,
    mut shutdown_rx: watch::Receiver<bool>,
    counters: Arc<StreamCounters>,
) -> JoinHandle<()> {
    let span = tracing::debug_span!("monitor", stream = name);
    let task = async move {
        tracing::debug!("Monitor started");
        loop {
            if *shutdown_rx.borrow() {
                break;
            }
            tokio::select! {
                result = monitor.advance() => {
                    match &result {
                        Ok(_) => {
                            counters.records.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => {
                            counters.failures.fetch_add(1, Ordering::Relaxed);
                            tracing::debug!(error = %e, "Tick failed, forwarding");
                        }
                    }
                    if tx.send(result).await.is_err() {
                        tracing::debug!("Receiver dropped");
                        break;
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::debug!("Monitor shutting down");
    };
    tokio::spawn(task.instrument(span))
}
