//! Linux implementation of [`HostNetwork`] driving `ip` and `arping`.

use async_trait::async_trait;
use lwotg_types::IpPrefix;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{HostError, HostResult};
use crate::shell::{self, shellquote, ARPING_CMD, IP_CMD};
use crate::HostNetwork;

/// Longest interface name the kernel accepts, in bytes.
const IFNAMSIZ_MAX: usize = 15;

/// Characters allowed in an interface name: no `/`, `:`, whitespace or NUL.
static IFNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^/:\s\x00]{1,15}$").expect("Invalid regex pattern"));

/// Commands and paths used by [`LinuxHost`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub ip_cmd: String,
    pub arping_cmd: String,
    /// Directory listing the host's network devices.
    pub sysfs_net: PathBuf,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            ip_cmd: IP_CMD.to_string(),
            arping_cmd: ARPING_CMD.to_string(),
            sysfs_net: PathBuf::from("/sys/class/net"),
        }
    }
}

/// Host networking through the Linux `ip` tooling.
#[derive(Debug, Clone, Default)]
pub struct LinuxHost {
    config: HostConfig,
}

impl LinuxHost {
    pub fn new(config: HostConfig) -> Self {
        Self { config }
    }

    /// Checks `name` against the kernel naming rule and the device list.
    pub async fn check_interface(&self, name: &str) -> HostResult<()> {
        if name.len() > IFNAMSIZ_MAX
            || name == "."
            || name == ".."
            || !IFNAME_RE.is_match(name)
        {
            return Err(HostError::invalid_interface(name, "not a valid interface name"));
        }

        let path = self.config.sysfs_net.join(name);
        match tokio::fs::try_exists(&path).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(HostError::invalid_interface(name, "no such device")),
            Err(e) => Err(HostError::invalid_interface(
                name,
                format!("cannot inspect {}: {}", path.display(), e),
            )),
        }
    }

    async fn global_ipv4_addresses(&self) -> HostResult<Vec<(String, IpPrefix)>> {
        let cmd = format!("{} -4 -o address show scope global", self.config.ip_cmd);
        let output = shell::exec_checked(&cmd).await?;
        Ok(parse_ip_addr_oneline(&output))
    }
}

#[async_trait]
impl HostNetwork for LinuxHost {
    async fn valid_interface(&self, name: &str) -> bool {
        match self.check_interface(name).await {
            Ok(()) => true,
            Err(e) => {
                debug!(interface = %name, error = %e, "Interface rejected");
                false
            }
        }
    }

    async fn add_ip(&self, name: &str, prefix: &IpPrefix) -> HostResult<()> {
        let cmd = format!(
            "{} address add {} dev {}",
            self.config.ip_cmd,
            shellquote(&prefix.to_string()),
            shellquote(name)
        );

        match shell::exec_checked(&cmd).await {
            Ok(_) => {
                info!(interface = %name, address = %prefix, "Added address");
                Ok(())
            }
            Err(e) if e.is_already_exists() => {
                debug!(interface = %name, address = %prefix, "Address already present");
                Ok(())
            }
            Err(e) => {
                warn!(interface = %name, address = %prefix, error = %e, "Cannot add address");
                Err(e)
            }
        }
    }

    async fn send_arp(&self) {
        let addresses = match self.global_ipv4_addresses().await {
            Ok(addresses) => addresses,
            Err(e) => {
                warn!(error = %e, "Cannot list interface addresses for ARP announcement");
                return;
            }
        };

        for (intf, prefix) in addresses {
            let cmd = format!(
                "{} -U -c 1 -I {} {}",
                self.config.arping_cmd,
                shellquote(&intf),
                shellquote(&prefix.address().to_string())
            );
            match shell::exec(&cmd).await {
                Ok(result) if result.success() => {
                    debug!(interface = %intf, address = %prefix, "Sent gratuitous ARP");
                }
                Ok(result) => {
                    warn!(interface = %intf, output = %result.combined_output(), "arping failed");
                }
                Err(e) => warn!(interface = %intf, error = %e, "arping failed"),
            }
        }
    }
}

/// Parses `ip -4 -o address show` output into (interface, address) pairs.
///
/// Lines look like
/// `2: eth0    inet 192.0.2.1/31 brd 255.255.255.255 scope global eth0\ ...`.
/// Unparseable lines are skipped.
pub fn parse_ip_addr_oneline(output: &str) -> Vec<(String, IpPrefix)> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let _index = fields.next()?;
            let name = fields.next()?;
            if fields.next()? != "inet" {
                return None;
            }
            let prefix: IpPrefix = fields.next()?.parse().ok()?;
            let name = name.split('@').next().unwrap_or(name);
            Some((name.to_string(), prefix))
        })
        .collect()
}
