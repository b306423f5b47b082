//! IP address and prefix types with safe parsing.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// An IPv4 address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ipv4Address(Ipv4Addr);

impl Ipv4Address {
    /// Returns the address with all bits past `prefix_len` cleared.
    pub fn masked(&self, prefix_len: u8) -> Self {
        let bits = u32::from(self.0);
        let mask = u32::MAX
            .checked_shl(32u32.saturating_sub(u32::from(prefix_len)))
            .unwrap_or(0);
        Ipv4Address(Ipv4Addr::from(bits & mask))
    }
}

impl fmt::Display for Ipv4Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Ipv4Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Ipv4Addr>()
            .map(Ipv4Address)
            .map_err(|_| ParseError::InvalidIpAddress(s.to_string()))
    }
}

/// An IPv6 address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ipv6Address(Ipv6Addr);

impl Ipv6Address {
    /// Returns the address with all bits past `prefix_len` cleared.
    pub fn masked(&self, prefix_len: u8) -> Self {
        let bits = u128::from(self.0);
        let mask = u128::MAX
            .checked_shl(128u32.saturating_sub(u32::from(prefix_len)))
            .unwrap_or(0);
        Ipv6Address(Ipv6Addr::from(bits & mask))
    }
}

impl fmt::Display for Ipv6Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Ipv6Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Ipv6Addr>()
            .map(Ipv6Address)
            .map_err(|_| ParseError::InvalidIpAddress(s.to_string()))
    }
}

/// An IP address that can be either IPv4 or IPv6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IpAddress {
    V4(Ipv4Address),
    V6(Ipv6Address),
}

impl IpAddress {
    pub const fn is_ipv4(&self) -> bool {
        matches!(self, IpAddress::V4(_))
    }

    const fn max_prefix_len(&self) -> u8 {
        match self {
            IpAddress::V4(_) => 32,
            IpAddress::V6(_) => 128,
        }
    }
}

impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpAddress::V4(addr) => addr.fmt(f),
            IpAddress::V6(addr) => addr.fmt(f),
        }
    }
}

impl FromStr for IpAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains(':') {
            s.parse::<Ipv6Address>().map(IpAddress::V6)
        } else {
            s.parse::<Ipv4Address>().map(IpAddress::V4)
        }
    }
}

/// An interface address in CIDR notation (e.g. `192.0.2.1/31`).
///
/// Unlike a route prefix, the host bits are preserved: `address()` is the
/// address assigned to the interface and [`IpPrefix::network`] yields the
/// covering subnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IpPrefix {
    address: IpAddress,
    prefix_len: u8,
}

impl IpPrefix {
    /// Creates a new prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix length exceeds 32 for IPv4 or 128 for
    /// IPv6.
    pub fn new(address: IpAddress, prefix_len: u8) -> Result<Self, ParseError> {
        let max_len = address.max_prefix_len();
        if prefix_len > max_len {
            return Err(ParseError::InvalidIpPrefix(format!(
                "prefix length {} exceeds maximum {} for address type",
                prefix_len, max_len
            )));
        }

        Ok(IpPrefix {
            address,
            prefix_len,
        })
    }

    /// Parses an address string and a separately carried prefix length.
    pub fn from_parts(address: &str, prefix_len: u32) -> Result<Self, ParseError> {
        let address: IpAddress = address.parse()?;
        let prefix_len = u8::try_from(prefix_len).map_err(|_| {
            ParseError::InvalidIpPrefix(format!("{}/{}", address, prefix_len))
        })?;
        IpPrefix::new(address, prefix_len)
    }

    pub const fn address(&self) -> &IpAddress {
        &self.address
    }

    pub const fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub const fn is_ipv4(&self) -> bool {
        self.address.is_ipv4()
    }

    /// Returns the subnet covering this address.
    pub fn network(&self) -> IpPrefix {
        let address = match self.address {
            IpAddress::V4(a) => IpAddress::V4(a.masked(self.prefix_len)),
            IpAddress::V6(a) => IpAddress::V6(a.masked(self.prefix_len)),
        };
        IpPrefix {
            address,
            prefix_len: self.prefix_len,
        }
    }
}

impl fmt::Display for IpPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

impl FromStr for IpPrefix {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr_str, len_str) = s
            .rsplit_once('/')
            .ok_or_else(|| ParseError::InvalidIpPrefix(s.to_string()))?;

        let address: IpAddress = addr_str.parse()?;
        let prefix_len: u8 = len_str
            .parse()
            .map_err(|_| ParseError::InvalidIpPrefix(s.to_string()))?;

        IpPrefix::new(address, prefix_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ip_address_discrimination() {
        let v4: IpAddress = "10.0.0.1".parse().unwrap();
        assert!(v4.is_ipv4());

        let v6: IpAddress = "2001:db8::1".parse().unwrap();
        assert!(!v6.is_ipv4());
    }

    #[test]
    fn test_prefix_keeps_host_bits() {
        let prefix: IpPrefix = "192.0.2.1/31".parse().unwrap();
        assert_eq!(prefix.to_string(), "192.0.2.1/31");
        assert_eq!(prefix.network().to_string(), "192.0.2.0/31");
    }

    #[test]
    fn test_from_parts() {
        let prefix = IpPrefix::from_parts("198.51.100.7", 24).unwrap();
        assert_eq!(prefix.prefix_len(), 24);
        assert_eq!(prefix.network().to_string(), "198.51.100.0/24");

        assert!(IpPrefix::from_parts("198.51.100.7", 33).is_err());
        assert!(IpPrefix::from_parts("198.51.100.7", 300).is_err());
        assert!(IpPrefix::from_parts("not-an-address", 24).is_err());
    }

    #[test]
    fn test_network_edges() {
        let host: IpPrefix = "10.1.2.3/32".parse().unwrap();
        assert_eq!(host.network(), host);

        let all: IpPrefix = "10.1.2.3/0".parse().unwrap();
        assert_eq!(all.network().to_string(), "0.0.0.0/0");

        let v6: IpPrefix = "2001:db8::5/64".parse().unwrap();
        assert_eq!(v6.network().to_string(), "2001:db8::/64");
    }

    #[test]
    fn test_invalid_prefix() {
        assert!("10.0.0.0/33".parse::<IpPrefix>().is_err());
        assert!("2001:db8::/129".parse::<IpPrefix>().is_err());
        assert!("10.0.0.0".parse::<IpPrefix>().is_err());
    }
}
