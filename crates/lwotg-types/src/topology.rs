//! Declarative topology configuration accepted by SetConfig.
//!
//! Field names follow the traffic-generator JSON schema (snake_case). Sections
//! this server does not implement (`lags`, `layer1`, `captures`, `options`)
//! are carried as opaque JSON so that their presence can be detected and
//! rejected without modelling them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a SetConfig request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetConfigRequest {
    #[serde(default)]
    pub config: Option<Config>,
}

impl SetConfigRequest {
    pub fn new(config: Config) -> Self {
        Self {
            config: Some(config),
        }
    }
}

/// A topology configuration snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ports: Vec<Port>,

    #[serde(default)]
    pub devices: Vec<Device>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lags: Vec<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layer1: Vec<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub captures: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl Config {
    pub fn with_port(mut self, port: Port) -> Self {
        self.ports.push(port);
        self
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.devices.push(device);
        self
    }

    /// Names the unsupported sections present in this configuration.
    pub fn unsupported_sections(&self) -> Vec<&'static str> {
        let mut found = Vec::new();
        if !self.lags.is_empty() {
            found.push("lags");
        }
        if !self.layer1.is_empty() {
            found.push("layer1");
        }
        if !self.captures.is_empty() {
            found.push("captures");
        }
        if self.options.is_some() {
            found.push("options");
        }
        found
    }
}

/// A test port. `location` is the host interface name, e.g. `eth0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Port {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: Some(location.into()),
        }
    }

    /// Returns the location if it is present and non-empty.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref().filter(|l| !l.is_empty())
    }
}

/// An emulated device owning one or more Ethernet endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub name: String,

    #[serde(default)]
    pub ethernets: Vec<DeviceEthernet>,
}

impl Device {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ethernets: Vec::new(),
        }
    }

    pub fn with_ethernet(mut self, ethernet: DeviceEthernet) -> Self {
        self.ethernets.push(ethernet);
        self
    }
}

/// A logical Ethernet endpoint bound to a port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEthernet {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,

    #[serde(default)]
    pub ipv4_addresses: Vec<DeviceIpv4>,
}

impl DeviceEthernet {
    pub fn new(name: impl Into<String>, port_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            port_name: Some(port_name.into()),
            ..Default::default()
        }
    }

    pub fn with_ipv4(mut self, address: impl Into<String>, prefix: u32) -> Self {
        let address = address.into();
        self.ipv4_addresses.push(DeviceIpv4 {
            name: format!("{}.ipv4.{}", self.name, self.ipv4_addresses.len()),
            address,
            gateway: String::new(),
            prefix: Some(prefix),
        });
        self
    }

    /// Returns the bound port name if it is present and non-empty.
    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref().filter(|p| !p.is_empty())
    }
}

/// An IPv4 address assignment on an Ethernet endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIpv4 {
    #[serde(default)]
    pub name: String,

    pub address: String,

    #[serde(default)]
    pub gateway: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<u32>,
}

impl DeviceIpv4 {
    /// Prefix length, with an absent prefix reading as zero.
    pub fn prefix_len(&self) -> u32 {
        self.prefix.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserialize_minimal() {
        let json = r#"{
            "ports": [{"name": "p1", "location": "eth0"}],
            "devices": [{
                "name": "dut",
                "ethernets": [{
                    "name": "dut.eth",
                    "port_name": "p1",
                    "ipv4_addresses": [
                        {"name": "dut.ipv4", "address": "192.0.2.1", "gateway": "192.0.2.0", "prefix": 31}
                    ]
                }]
            }]
        }"#;

        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.ports[0].location(), Some("eth0"));
        assert_eq!(cfg.devices[0].ethernets[0].port_name(), Some("p1"));
        assert_eq!(cfg.devices[0].ethernets[0].ipv4_addresses[0].prefix_len(), 31);
        assert!(cfg.unsupported_sections().is_empty());
    }

    #[test]
    fn test_unsupported_sections() {
        let json = r#"{"lags": [{"name": "lag1"}], "captures": [{}], "options": {"port_options": {}}}"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.unsupported_sections(), vec!["lags", "captures", "options"]);
    }

    #[test]
    fn test_null_options_is_absent() {
        let cfg: Config = serde_json::from_str(r#"{"options": null}"#).unwrap();
        assert!(cfg.options.is_none());
    }

    #[test]
    fn test_empty_strings_read_as_absent() {
        let port = Port {
            name: "p1".to_string(),
            location: Some(String::new()),
        };
        assert_eq!(port.location(), None);

        let eth = DeviceEthernet {
            name: "e1".to_string(),
            port_name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(eth.port_name(), None);
    }

    #[test]
    fn test_missing_prefix_reads_as_zero() {
        let addr: DeviceIpv4 = serde_json::from_str(r#"{"address": "10.0.0.1"}"#).unwrap();
        assert_eq!(addr.prefix_len(), 0);
    }

    #[test]
    fn test_builders() {
        let cfg = Config::default()
            .with_port(Port::new("p1", "eth0"))
            .with_device(
                Device::new("d1").with_ethernet(
                    DeviceEthernet::new("d1.eth0", "p1")
                        .with_ipv4("192.0.2.1", 31)
                        .with_ipv4("198.51.100.1", 24),
                ),
            );

        let eth = &cfg.devices[0].ethernets[0];
        assert_eq!(eth.ipv4_addresses.len(), 2);
        assert_eq!(eth.ipv4_addresses[1].name, "d1.eth0.ipv4.1");
    }
}
