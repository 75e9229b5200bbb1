// Observers: build once, hand out independent periodic monitors

mod hardware;
mod network;

pub use hardware::{CpuMonitor, DiskMonitor, HardwareIntervals, HardwareObserver};
pub use network::{
    ConnectionsMonitor, NetworkIntervals, NetworkObserver, StatsMonitor, TrafficMonitor,
};
