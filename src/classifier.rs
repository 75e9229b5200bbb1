// Partition a connection snapshot by the local interface that owns each local address

use crate::models::{AddressConnections, Connection, Interface, InterfaceConnections};
use std::sync::Arc;

/// One group per interface, in catalog order. A connection lands in every
/// interface with a matching address and in none if nothing matches.
/// Connection order within a group is the provider's order.
pub fn classify(
    interfaces: &[Arc<Interface>],
    connections: &[Connection],
) -> Vec<InterfaceConnections> {
    interfaces
        .iter()
        .map(|interface| InterfaceConnections {
            interface: Arc::clone(interface),
            connections: connections
                .iter()
                .filter(|conn| owns(interface, &conn.local_address))
                .cloned()
                .collect(),
        })
        .collect()
}

fn owns(interface: &Interface, local_address: &str) -> bool {
    interface
        .addresses
        .iter()
        .any(|addr| addr.matches(local_address))
}

impl InterfaceConnections {
    /// Groups this interface's connections by the known address they matched,
    /// one entry per address in interface order (possibly empty).
    pub fn by_address(&self) -> Vec<AddressConnections<'_>> {
        self.interface
            .addresses
            .iter()
            .map(|address| AddressConnections {
                address,
                connections: self
                    .connections
                    .iter()
                    .filter(|conn| address.matches(&conn.local_address))
                    .collect(),
            })
            .collect()
    }
}
