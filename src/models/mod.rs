// Domain models: interfaces, connections, link stats, traffic, CPU and disk

mod hardware;
mod network;

pub use hardware::{
    CpuCounters, CpuFreq, CpuStats, CpuTimesPercent, DiskIoCounters, DiskPartitionStats,
    DiskStats, DiskUsage, PartitionInfo,
};
pub use network::{
    AddressConnections, AddressKind, Connection, Duplex, Interface, InterfaceAddress,
    InterfaceConnections, InterfaceStats, RawLinkStats, RemoteEndpoint, SocketFamily, SocketKind,
    TrafficDelta, TrafficRates, TrafficSample,
};
