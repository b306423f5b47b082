//! Default protocol handler for the daemon.

use async_trait::async_trait;
use lwotg_host::HostNetwork;
use lwotg_types::{Config, ProtocolState};
use std::sync::Arc;
use tracing::info;

use crate::error::OtgResult;
use crate::handler::ProtocolHandler;

/// Re-announces configured addresses when protocols start, so that peers
/// learn the emulated hosts' MAC addresses.
pub struct ArpAnnouncer {
    host: Arc<dyn HostNetwork>,
}

impl ArpAnnouncer {
    pub fn new(host: Arc<dyn HostNetwork>) -> Self {
        Self { host }
    }
}

#[async_trait]
impl ProtocolHandler for ArpAnnouncer {
    async fn set_protocol_state(
        &self,
        config: Option<&Config>,
        state: ProtocolState,
    ) -> OtgResult<()> {
        match state {
            ProtocolState::Start => {
                let devices = config.map_or(0, |c| c.devices.len());
                info!(devices, "Starting protocols, announcing addresses");
                self.host.send_arp().await;
            }
            ProtocolState::Stop => info!("Stopping protocols"),
        }
        Ok(())
    }
}
