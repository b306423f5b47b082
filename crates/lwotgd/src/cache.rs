//! Record of addresses already applied to host interfaces.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;

/// Addresses wanted on, or applied to, one host interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinuxIntf {
    /// IPv4 address → prefix length.
    pub ipv4: BTreeMap<String, u32>,
}

impl LinuxIntf {
    pub fn has_addr(&self, addr: &str) -> bool {
        self.ipv4.contains_key(addr)
    }
}

/// Per-interface address state, keyed by host interface name.
pub type InterfaceMap = BTreeMap<String, LinuxIntf>;

/// The applied-address cache.
///
/// Each successful reconciliation pass replaces the whole map. Interfaces
/// missing from the latest configuration are forgotten even though their
/// addresses remain on the host.
#[derive(Debug, Default)]
pub struct InterfaceCache {
    inner: Mutex<InterfaceMap>,
}

impl InterfaceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `addr` is recorded as applied on interface `name`.
    pub fn has_addr(&self, name: &str, addr: &str) -> bool {
        self.inner
            .lock()
            .get(name)
            .is_some_and(|intf| intf.has_addr(addr))
    }

    pub fn replace(&self, interfaces: InterfaceMap) {
        *self.inner.lock() = interfaces;
    }

    pub fn snapshot(&self) -> InterfaceMap {
        self.inner.lock().clone()
    }
}
