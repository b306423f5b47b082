//! The control server facade.

use lwotg_host::HostNetwork;
use lwotg_types::{
    Config, Hint, HintGroup, ResponseWarning, SetConfigRequest, SetProtocolStateRequest,
    SetTransmitStateRequest,
};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cache::{InterfaceCache, InterfaceMap};
use crate::error::{OtgError, OtgResult};
use crate::handler::{ConfigHandler, ProtocolHandler};
use crate::hint::HintSink;
use crate::reconciler::BaseInterfaceConfig;

/// Lightweight traffic-generator control server.
///
/// Owns:
/// - the applied-address cache
/// - the ordered configuration handler pipeline
/// - the hint sink
/// - the protocol handler
/// - the last accepted configuration
///
/// Each piece of shared state sits behind its own lock and no lock is held
/// across an `.await`. Concurrent SetConfig calls are not ordered with
/// respect to each other; the last pipeline to finish decides the stored
/// configuration and cache.
pub struct Server {
    cache: Arc<InterfaceCache>,
    hints: HintSink,
    config_handlers: RwLock<Vec<Arc<dyn ConfigHandler>>>,
    protocol_handler: RwLock<Option<Arc<dyn ProtocolHandler>>>,
    current: RwLock<Option<Arc<Config>>>,
}

impl Server {
    /// Creates a server with [`BaseInterfaceConfig`] as its first handler.
    pub fn new(host: Arc<dyn HostNetwork>) -> Self {
        let server = Self::without_handlers();
        server.add_config_handler(Arc::new(BaseInterfaceConfig::new(
            host,
            server.cache.clone(),
            server.hints.clone(),
        )));
        server
    }

    /// Creates a server with an empty handler pipeline.
    pub fn without_handlers() -> Self {
        Self {
            cache: Arc::new(InterfaceCache::new()),
            hints: HintSink::new(),
            config_handlers: RwLock::new(Vec::new()),
            protocol_handler: RwLock::new(None),
            current: RwLock::new(None),
        }
    }

    /// Routes hints to `tx`.
    pub fn set_hint_channel(&self, tx: mpsc::Sender<Hint>) {
        self.hints.set(tx);
    }

    pub fn set_protocol_handler(&self, handler: Arc<dyn ProtocolHandler>) {
        *self.protocol_handler.write() = Some(handler);
    }

    /// Appends `handler` to the configuration pipeline.
    pub fn add_config_handler(&self, handler: Arc<dyn ConfigHandler>) {
        let mut handlers = self.config_handlers.write();
        debug!(handler = %handler.name(), position = handlers.len(), "Registered config handler");
        handlers.push(handler);
    }

    pub fn hints(&self) -> &HintSink {
        &self.hints
    }

    /// The last accepted configuration.
    pub fn current_config(&self) -> Option<Arc<Config>> {
        self.current.read().clone()
    }

    /// Addresses recorded as applied by the last successful pass.
    pub fn applied_interfaces(&self) -> InterfaceMap {
        self.cache.snapshot()
    }

    /// Validates `req`, runs it through every handler in order and, if all
    /// succeed, stores it as the current configuration.
    pub async fn set_config(&self, req: SetConfigRequest) -> OtgResult<ResponseWarning> {
        let rendered = self.hints.is_connected().then(|| {
            serde_json::to_string_pretty(&req).unwrap_or_else(|_| format!("{:?}", req))
        });

        let Some(config) = req.config else {
            return Err(OtgError::invalid_argument(
                "invalid request configuration received, no config present",
            ));
        };

        info!(
            ports = config.ports.len(),
            devices = config.devices.len(),
            "Got config"
        );

        let unsupported = config.unsupported_sections();
        if !unsupported.is_empty() {
            return Err(OtgError::unimplemented(format!(
                "request contained fields that are unimplemented: {}",
                unsupported.join(", ")
            )));
        }

        if let Some(rendered) = rendered {
            self.hints
                .send(Hint::new(HintGroup::Meta, "SetConfig", rendered));
        }

        let handlers = self.config_handlers.read().clone();
        for handler in &handlers {
            if let Err(e) = handler.apply(&config).await {
                warn!(handler = %handler.name(), error = %e, "Config handler failed");
                return Err(e);
            }
        }

        *self.current.write() = Some(Arc::new(config));
        info!(handlers = handlers.len(), "Config applied");

        Ok(ResponseWarning::default())
    }

    /// Delegates to the registered protocol handler with the current
    /// configuration.
    pub async fn set_protocol_state(
        &self,
        req: SetProtocolStateRequest,
    ) -> OtgResult<ResponseWarning> {
        let state = req.state();
        info!(state = %state, "Setting protocol state requested");

        let handler = self.protocol_handler.read().clone();
        let Some(handler) = handler else {
            return Err(OtgError::internal(format!(
                "no protocol handler registered, cannot set protocol state {}",
                state
            )));
        };

        let config = self.current_config();
        handler.set_protocol_state(config.as_deref(), state).await?;

        Ok(ResponseWarning::default())
    }

    /// Acknowledges the request. Traffic is driven elsewhere.
    pub async fn set_transmit_state(
        &self,
        req: SetTransmitStateRequest,
    ) -> OtgResult<ResponseWarning> {
        info!(
            state = %req.transmit_state.state,
            flows = req.transmit_state.flow_names.len(),
            "Setting traffic state requested"
        );
        Ok(ResponseWarning::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use async_trait::async_trait;
    use lwotg_types::{Port, ProtocolState, TransmitState};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config_with_port() -> Config {
        Config::default().with_port(Port::new("p1", "eth0"))
    }

    #[tokio::test]
    async fn test_missing_config_is_invalid_argument() {
        let server = Server::without_handlers();
        let err = server.set_config(SetConfigRequest::default()).await.unwrap_err();
        assert!(matches!(err, OtgError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_unsupported_sections_rejected() {
        let calls = Arc::new(Mutex::new(0));
        let server = Server::without_handlers();
        let counter = calls.clone();
        server.add_config_handler(Arc::new(handler_fn("count", move |_| {
            *counter.lock() += 1;
            Ok(())
        })));

        let mut with_lags = config_with_port();
        with_lags.lags.push(json!({"name": "lag1"}));
        let mut with_layer1 = config_with_port();
        with_layer1.layer1.push(json!({"name": "l1"}));
        let mut with_captures = config_with_port();
        with_captures.captures.push(json!({"name": "cap"}));
        let mut with_options = config_with_port();
        with_options.options = Some(json!({}));

        for cfg in [with_lags, with_layer1, with_captures, with_options] {
            let err = server
                .set_config(SetConfigRequest::new(cfg))
                .await
                .unwrap_err();
            assert!(matches!(err, OtgError::Unimplemented(_)));
        }
        assert_eq!(*calls.lock(), 0);
        assert!(server.current_config().is_none());
    }

    #[tokio::test]
    async fn test_handlers_run_in_order_and_stop_on_error() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let server = Server::without_handlers();

        for (name, fail) in [("first", false), ("second", true), ("third", false)] {
            let order = order.clone();
            server.add_config_handler(Arc::new(handler_fn(name, move |_| {
                order.lock().push(name);
                if fail {
                    Err(OtgError::internal(format!("{} failed", name)))
                } else {
                    Ok(())
                }
            })));
        }

        let err = server
            .set_config(SetConfigRequest::new(config_with_port()))
            .await
            .unwrap_err();
        assert_eq!(err, OtgError::internal("second failed"));
        assert_eq!(*order.lock(), vec!["first", "second"]);
        assert!(server.current_config().is_none());
    }

    #[tokio::test]
    async fn test_success_replaces_current_config() {
        let server = Server::without_handlers();
        server
            .set_config(SetConfigRequest::new(config_with_port()))
            .await
            .unwrap();

        let second = Config::default().with_port(Port::new("p2", "eth1"));
        server
            .set_config(SetConfigRequest::new(second.clone()))
            .await
            .unwrap();
        assert_eq!(server.current_config().as_deref(), Some(&second));
    }

    #[tokio::test]
    async fn test_meta_hint_emitted() {
        let server = Server::without_handlers();
        let (tx, mut rx) = crate::hint::hint_channel(4);
        server.set_hint_channel(tx);

        server
            .set_config(SetConfigRequest::new(config_with_port()))
            .await
            .unwrap();

        let hint = rx.try_recv().unwrap();
        assert!(hint.is_group(HintGroup::Meta));
        assert_eq!(hint.key, "SetConfig");
        assert!(hint.value.contains("eth0"));
    }

    #[tokio::test]
    async fn test_protocol_state_without_handler_is_internal() {
        let server = Server::without_handlers();
        let err = server
            .set_protocol_state(SetProtocolStateRequest::new(ProtocolState::Start))
            .await
            .unwrap_err();
        assert!(matches!(err, OtgError::Internal(_)));
    }

    struct Recorder {
        seen: Mutex<Vec<(Option<usize>, ProtocolState)>>,
    }

    #[async_trait]
    impl ProtocolHandler for Recorder {
        async fn set_protocol_state(
            &self,
            config: Option<&Config>,
            state: ProtocolState,
        ) -> OtgResult<()> {
            self.seen.lock().push((config.map(|c| c.ports.len()), state));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_protocol_state_receives_current_config() {
        let server = Server::without_handlers();
        let recorder = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
        });
        server.set_protocol_handler(recorder.clone());

        server
            .set_protocol_state(SetProtocolStateRequest::new(ProtocolState::Stop))
            .await
            .unwrap();
        server
            .set_config(SetConfigRequest::new(config_with_port()))
            .await
            .unwrap();
        server
            .set_protocol_state(SetProtocolStateRequest::new(ProtocolState::Start))
            .await
            .unwrap();

        assert_eq!(
            *recorder.seen.lock(),
            vec![(None, ProtocolState::Stop), (Some(1), ProtocolState::Start)]
        );
    }

    #[tokio::test]
    async fn test_transmit_state_always_acks() {
        let server = Server::without_handlers();
        for state in [
            TransmitState::Start,
            TransmitState::Stop,
            TransmitState::Pause,
            TransmitState::Resume,
        ] {
            let ack = server
                .set_transmit_state(SetTransmitStateRequest::new(state))
                .await
                .unwrap();
            assert!(ack.warnings.is_empty());
        }
    }
}
