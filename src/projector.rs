// Project per-name raw link stats onto catalog interfaces

use crate::error::{ObserverError, Result};
use crate::models::{Interface, InterfaceStats, RawLinkStats};
use std::collections::HashMap;
use std::sync::Arc;

/// Looks up each interface by exact name. The first interface without an
/// entry fails the whole projection; no partial record is returned.
pub fn project(
    interfaces: &[Arc<Interface>],
    raw_stats: &HashMap<String, RawLinkStats>,
) -> Result<Vec<InterfaceStats>> {
    interfaces
        .iter()
        .map(|interface| {
            let raw = raw_stats
                .get(&interface.name)
                .ok_or_else(|| ObserverError::MissingStats(interface.name.clone()))?;
            Ok(InterfaceStats {
                interface: Arc::clone(interface),
                is_up: raw.is_up,
                duplex: raw.duplex,
                speed_mbps: raw.speed_mbps,
                mtu: raw.mtu,
                flags: raw.flags.clone(),
            })
        })
        .collect()
}
