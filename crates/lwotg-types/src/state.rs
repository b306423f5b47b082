//! Protocol and transmit control requests.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Requested state for all emulated protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolState {
    Start,
    Stop,
}

impl ProtocolState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProtocolState::Start => "start",
            ProtocolState::Stop => "stop",
        }
    }
}

impl fmt::Display for ProtocolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested state for traffic flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransmitState {
    Start,
    Stop,
    Pause,
    Resume,
}

impl TransmitState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransmitState::Start => "start",
            TransmitState::Stop => "stop",
            TransmitState::Pause => "pause",
            TransmitState::Resume => "resume",
        }
    }
}

impl fmt::Display for TransmitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolStateRequest {
    pub state: ProtocolState,
}

/// Body of a SetProtocolState request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetProtocolStateRequest {
    pub protocol_state: ProtocolStateRequest,
}

impl SetProtocolStateRequest {
    pub fn new(state: ProtocolState) -> Self {
        Self {
            protocol_state: ProtocolStateRequest { state },
        }
    }

    pub fn state(&self) -> ProtocolState {
        self.protocol_state.state
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransmitStateRequest {
    /// Flows the request applies to; empty means all flows.
    #[serde(default)]
    pub flow_names: Vec<String>,
    pub state: TransmitState,
}

/// Body of a SetTransmitState request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetTransmitStateRequest {
    pub transmit_state: TransmitStateRequest,
}

impl SetTransmitStateRequest {
    pub fn new(state: TransmitState) -> Self {
        Self {
            transmit_state: TransmitStateRequest {
                flow_names: Vec::new(),
                state,
            },
        }
    }
}

/// Successful response body. Warnings are informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseWarning {
    #[serde(default)]
    pub warnings: Vec<String>,
}
