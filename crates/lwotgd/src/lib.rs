//! Lightweight traffic-generator control plane.
//!
//! lwotgd accepts a declarative topology (ports, devices, Ethernet
//! endpoints, addresses) and reconciles it against the host it runs on:
//! - assigns configured addresses to host interfaces, once
//! - announces them with gratuitous ARP
//! - notifies observers through best-effort hints
//! - delegates protocol start/stop to an embedder-supplied handler
//!
//! # Architecture
//!
//! ```text
//! request ──▶ Server::set_config
//!               ├─ reject unsupported sections
//!               ├─ hint "meta/SetConfig"
//!               └─ ConfigHandler pipeline (in order)
//!                    └─ BaseInterfaceConfig ──▶ HostNetwork
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod handler;
pub mod hint;
pub mod protocol;
pub mod reconciler;
pub mod server;

pub use cache::{InterfaceCache, InterfaceMap, LinuxIntf};
pub use config::DaemonConfig;
pub use error::{ErrorCode, OtgError, OtgResult};
pub use handler::{handler_fn, ConfigHandler, ProtocolHandler};
pub use hint::{hint_channel, spawn_hint_logger, HintSink};
pub use protocol::ArpAnnouncer;
pub use reconciler::{ports_to_linux, BaseInterfaceConfig};
pub use server::Server;
