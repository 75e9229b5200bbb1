// Network interface, connection and traffic models

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Address family of an interface address, detected once from its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AddressKind {
    Mac,
    Ipv4,
    Ipv6,
    /// Neither a MAC nor an IP literal; never matches anything.
    Other,
}

/// A single address bound to an interface. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceAddress {
    pub(crate) raw_text: String,
    pub(crate) kind: AddressKind,
}

impl InterfaceAddress {
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn kind(&self) -> AddressKind {
        self.kind
    }
}

/// A local network interface as seen when the catalog was built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interface {
    pub name: String,
    pub addresses: Vec<InterfaceAddress>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SocketFamily {
    Inet,
    Inet6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SocketKind {
    Tcp,
    Udp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEndpoint {
    pub address: String,
    pub port: u16,
}

/// One row of the system connection table, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub family: SocketFamily,
    pub kind: SocketKind,
    pub local_address: String,
    pub local_port: u16,
    pub remote: Option<RemoteEndpoint>,
    pub status: String,
    pub pid: Option<u32>,
}

/// Connections attributed to one known address of an interface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressConnections<'a> {
    pub address: &'a InterfaceAddress,
    pub connections: Vec<&'a Connection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceConnections {
    pub interface: Arc<Interface>,
    pub connections: Vec<Connection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Duplex {
    Full,
    Half,
    Unknown,
}

/// Link status of one interface as keyed by name in the provider snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLinkStats {
    pub is_up: bool,
    pub duplex: Duplex,
    pub speed_mbps: u64,
    pub mtu: u64,
    pub flags: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceStats {
    pub interface: Arc<Interface>,
    pub is_up: bool,
    pub duplex: Duplex,
    pub speed_mbps: u64,
    pub mtu: u64,
    pub flags: String,
}

/// Absolute traffic counters since an arbitrary epoch, summed over all interfaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficSample {
    pub sent_bytes: u64,
    pub recv_bytes: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub err_in: u64,
    pub err_out: u64,
    pub drop_in: u64,
    pub drop_out: u64,
}

/// Difference between two consecutive samples. Negative values mean the
/// underlying counters wrapped or were reset and are reported as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficDelta {
    pub sent_bytes: i64,
    pub recv_bytes: i64,
    pub packets_sent: i64,
    pub packets_recv: i64,
    pub err_in: i64,
    pub err_out: i64,
    pub drop_in: i64,
    pub drop_out: i64,
    pub interval_s: f64,
}

/// Per-second view of a [`TrafficDelta`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficRates {
    pub sent_bytes_per_sec: f64,
    pub recv_bytes_per_sec: f64,
    pub packets_sent_per_sec: f64,
    pub packets_recv_per_sec: f64,
    pub err_in_per_sec: f64,
    pub err_out_per_sec: f64,
    pub drop_in_per_sec: f64,
    pub drop_out_per_sec: f64,
}
