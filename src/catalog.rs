// Interface catalog: local interfaces and their bound addresses, built once

use crate::error::{ObserverError, Result};
use crate::models::{Interface, InterfaceAddress};
use crate::provider::MetricsProvider;
use std::sync::Arc;

/// Immutable set of interfaces known to an observer. Cloning shares the
/// same `Arc<Interface>` values, so records keep reference identity.
#[derive(Debug, Clone)]
pub struct InterfaceCatalog {
    interfaces: Arc<[Arc<Interface>]>,
}

impl InterfaceCatalog {
    /// Enumerates interface names, then resolves each against one address
    /// snapshot. A name missing from that snapshot fails the whole build.
    /// Interfaces with no addresses are kept with an empty address list.
    pub fn build(provider: &dyn MetricsProvider) -> Result<Self> {
        let names = provider.interface_names()?;
        let mut addresses = provider.interface_addresses()?;

        let mut interfaces = Vec::with_capacity(names.len());
        for name in names {
            let texts = addresses
                .remove(&name)
                .ok_or_else(|| ObserverError::UnknownInterface(name.clone()))?;
            interfaces.push(Arc::new(Interface {
                name,
                addresses: texts.into_iter().map(InterfaceAddress::new).collect(),
            }));
        }
        tracing::debug!(
            operation = "build_catalog",
            interfaces = interfaces.len(),
            "Interface catalog built"
        );
        Ok(Self::from_interfaces(interfaces))
    }

    pub fn from_interfaces(interfaces: Vec<Arc<Interface>>) -> Self {
        Self {
            interfaces: interfaces.into(),
        }
    }

    pub fn interfaces(&self) -> &[Arc<Interface>] {
        &self.interfaces
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Interface>> {
        self.interfaces.iter().find(|i| i.name == name)
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }
}
