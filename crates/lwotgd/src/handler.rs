//! Configuration and protocol-state handler traits.
//!
//! The server runs every registered [`ConfigHandler`] against each accepted
//! configuration, in registration order. Embedders extend coverage (for
//! example routing protocols) by registering more handlers rather than
//! changing the server.

use async_trait::async_trait;
use lwotg_types::{Config, ProtocolState};

use crate::error::OtgResult;

/// A step in the configuration pipeline.
#[async_trait]
pub trait ConfigHandler: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Applies `config`. An error aborts the SetConfig call and is returned
    /// to the caller unchanged.
    async fn apply(&self, config: &Config) -> OtgResult<()>;
}

/// Reacts to SetProtocolState requests.
#[async_trait]
pub trait ProtocolHandler: Send + Sync {
    /// `config` is the last accepted configuration, if any.
    async fn set_protocol_state(
        &self,
        config: Option<&Config>,
        state: ProtocolState,
    ) -> OtgResult<()>;
}

/// A [`ConfigHandler`] backed by a synchronous closure.
pub struct FnHandler<F> {
    name: String,
    f: F,
}

/// Wraps `f` as a named configuration handler.
pub fn handler_fn<F>(name: impl Into<String>, f: F) -> FnHandler<F>
where
    F: Fn(&Config) -> OtgResult<()> + Send + Sync,
{
    FnHandler {
        name: name.into(),
        f,
    }
}

#[async_trait]
impl<F> ConfigHandler for FnHandler<F>
where
    F: Fn(&Config) -> OtgResult<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(&self, config: &Config) -> OtgResult<()> {
        (self.f)(config)
    }
}
