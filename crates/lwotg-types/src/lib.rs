//! Common types for the lightweight traffic-generator control plane.
//!
//! - [`Config`]: the declarative topology pushed by a SetConfig request
//! - [`IpAddress`], [`IpPrefix`]: address types with safe parsing
//! - [`ProtocolState`], [`TransmitState`]: control request payloads
//! - [`Hint`]: best-effort notification records sent to observers

mod hint;
mod ip;
mod state;
mod topology;

pub use hint::{Hint, HintGroup};
pub use ip::{IpAddress, IpPrefix, Ipv4Address, Ipv6Address};
pub use state::{
    ProtocolState, ProtocolStateRequest, ResponseWarning, SetProtocolStateRequest,
    SetTransmitStateRequest, TransmitState, TransmitStateRequest,
};
pub use topology::{Config, Device, DeviceEthernet, DeviceIpv4, Port, SetConfigRequest};

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid IP address format: {0}")]
    InvalidIpAddress(String),

    #[error("invalid IP prefix format: {0}")]
    InvalidIpPrefix(String),
}
