//! Host networking for the lightweight OTG server.
//!
//! The control server never touches the kernel directly. Everything it
//! needs from the host goes through the [`HostNetwork`] trait:
//!
//! - [`HostNetwork::valid_interface`]: is this a configurable interface?
//! - [`HostNetwork::add_ip`]: assign an address to an interface
//! - [`HostNetwork::send_arp`]: announce configured addresses
//!
//! [`LinuxHost`] implements the trait on top of the [`shell`] module using
//! `ip` and `arping`.
//!
//! # Example
//!
//! ```ignore
//! use lwotg_host::{HostConfig, HostNetwork, LinuxHost};
//!
//! let host = LinuxHost::new(HostConfig::default());
//! if host.valid_interface("eth0").await {
//!     host.add_ip("eth0", &"192.0.2.1/31".parse()?).await?;
//!     host.send_arp().await;
//! }
//! ```

pub mod error;
pub mod linux;
pub mod shell;

use async_trait::async_trait;
use lwotg_types::IpPrefix;

pub use error::{HostError, HostResult};
pub use linux::{HostConfig, LinuxHost};

/// Host networking operations consumed by the interface reconciler.
#[async_trait]
pub trait HostNetwork: Send + Sync {
    /// Returns true if `name` names an interface that may be configured.
    async fn valid_interface(&self, name: &str) -> bool;

    /// Assigns `prefix` to interface `name`.
    ///
    /// Assigning an address the interface already carries must succeed.
    async fn add_ip(&self, name: &str, prefix: &IpPrefix) -> HostResult<()>;

    /// Announces configured addresses with gratuitous ARP.
    ///
    /// Failures are logged by the implementation and never reported.
    async fn send_arp(&self);
}
