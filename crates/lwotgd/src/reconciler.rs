//! Interface reconciliation: topology configuration → host addresses.
//!
//! [`ports_to_linux`] is the pure half. It validates the configuration and
//! computes, per host interface, the addresses the configuration wants,
//! plus the host-interface → Ethernet-endpoint name map.
//!
//! [`BaseInterfaceConfig`] is the default configuration handler. It applies
//! the addresses that the applied cache does not already hold, announces
//! them, and then replaces the cache.

use async_trait::async_trait;
use lwotg_host::HostNetwork;
use lwotg_types::{Config, Hint, HintGroup, IpPrefix};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::{InterfaceCache, InterfaceMap, LinuxIntf};
use crate::error::{OtgError, OtgResult};
use crate::handler::ConfigHandler;
use crate::hint::HintSink;

/// Host interface name → Ethernet endpoint name.
pub type EthernetMap = BTreeMap<String, String>;

/// Computes the desired per-interface addresses for `config`.
///
/// Ethernet endpoints resolve to host interfaces through their port's
/// location. If two endpoints resolve to the same interface, the later one
/// wins both the name mapping and the address set.
pub fn ports_to_linux(config: &Config) -> OtgResult<(InterfaceMap, EthernetMap)> {
    let mut phys_intf: HashMap<&str, &str> = HashMap::with_capacity(config.ports.len());
    for port in &config.ports {
        let location = port.location().ok_or_else(|| {
            OtgError::invalid_argument(format!(
                "invalid interface {}, does not specify a port location",
                port.name
            ))
        })?;
        phys_intf.insert(port.name.as_str(), location);
    }

    let mut interfaces = InterfaceMap::new();
    let mut eth_map = EthernetMap::new();
    for device in &config.devices {
        for eth in &device.ethernets {
            let port_name = eth.port_name().ok_or_else(|| {
                OtgError::invalid_argument(format!(
                    "invalid ethernet {} on device {}, does not specify a port name",
                    eth.name, device.name
                ))
            })?;
            let linux_name = phys_intf.get(port_name).ok_or_else(|| {
                OtgError::invalid_argument(format!(
                    "invalid port name {} for ethernet {}, does not map to a real interface",
                    port_name, eth.name
                ))
            })?;

            eth_map.insert(linux_name.to_string(), eth.name.clone());

            let mut intf = LinuxIntf::default();
            for addr in &eth.ipv4_addresses {
                let prefix = addr.prefix_len();
                if prefix == 0 {
                    return Err(OtgError::invalid_argument(format!(
                        "unsupported zero prefix length for address {}",
                        addr.address
                    )));
                }
                intf.ipv4.insert(addr.address.clone(), prefix);
            }
            interfaces.insert(linux_name.to_string(), intf);
        }
    }

    Ok((interfaces, eth_map))
}

/// The default configuration handler: assigns configured addresses to host
/// interfaces.
pub struct BaseInterfaceConfig {
    host: Arc<dyn HostNetwork>,
    cache: Arc<InterfaceCache>,
    hints: HintSink,
}

impl BaseInterfaceConfig {
    pub fn new(host: Arc<dyn HostNetwork>, cache: Arc<InterfaceCache>, hints: HintSink) -> Self {
        Self { host, cache, hints }
    }

    async fn apply_interface(&self, name: &str, intf: &LinuxIntf) -> OtgResult<()> {
        if !self.host.valid_interface(name).await {
            return Err(OtgError::internal(format!(
                "interface {} is not configurable",
                name
            )));
        }

        for (addr, prefix_len) in &intf.ipv4 {
            let prefix = IpPrefix::from_parts(addr, *prefix_len).map_err(|e| {
                OtgError::invalid_argument(format!(
                    "invalid prefix {}/{} for interface {}: {}",
                    addr, prefix_len, name, e
                ))
            })?;
            if !prefix.is_ipv4() {
                return Err(OtgError::invalid_argument(format!(
                    "address {} on interface {} is not an IPv4 address",
                    addr, name
                )));
            }

            if self.cache.has_addr(name, addr) {
                debug!(interface = %name, address = %prefix, "Address already applied, skipping");
                continue;
            }

            info!(interface = %name, address = %prefix, network = %prefix.network(), "Configuring interface address");
            self.host.add_ip(name, &prefix).await.map_err(|e| {
                OtgError::internal(format!(
                    "cannot configure address {} on interface {}: {}",
                    addr, name, e
                ))
            })?;
        }

        Ok(())
    }
}

#[async_trait]
impl ConfigHandler for BaseInterfaceConfig {
    fn name(&self) -> &str {
        "base_interface_config"
    }

    async fn apply(&self, config: &Config) -> OtgResult<()> {
        let (interfaces, eth_map) = ports_to_linux(config)?;

        if self.hints.is_connected() {
            for (linux_if, eth_name) in &eth_map {
                debug!(interface = %linux_if, ethernet = %eth_name, "Sending interface map hint");
                self.hints
                    .send(Hint::new(HintGroup::InterfaceMap, linux_if, eth_name));
            }
        }

        for (name, intf) in &interfaces {
            if let Err(e) = self.apply_interface(name, intf).await {
                warn!(interface = %name, error = %e, "Interface configuration failed");
                return Err(e);
            }
        }

        self.host.send_arp().await;
        self.cache.replace(interfaces);
        Ok(())
    }
}
