//! JSON-over-HTTP surface for the control server.
//!
//! | Route               | Method | Operation          |
//! |---------------------|--------|--------------------|
//! | `/config`           | POST   | SetConfig          |
//! | `/config`           | GET    | current config     |
//! | `/control/protocol` | POST   | SetProtocolState   |
//! | `/control/transmit` | POST   | SetTransmitState   |
//! | `/interfaces`       | GET    | applied cache      |

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use lwotg_types::{
    Config, ResponseWarning, SetConfigRequest, SetProtocolStateRequest, SetTransmitStateRequest,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::cache::InterfaceMap;
use crate::error::{ErrorCode, OtgError};
use crate::server::Server;

/// Error body returned with every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorCode::Unimplemented => StatusCode::NOT_IMPLEMENTED,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for OtgError {
    fn into_response(self) -> Response {
        let code = self.code();
        let body = ErrorBody {
            code,
            message: self.message().to_string(),
        };
        (code.status(), Json(body)).into_response()
    }
}

/// Builds the API router around `server`.
pub fn router(server: Arc<Server>) -> Router {
    Router::new()
        .route("/config", post(set_config).get(get_config))
        .route("/control/protocol", post(set_protocol_state))
        .route("/control/transmit", post(set_transmit_state))
        .route("/interfaces", get(get_interfaces))
        .with_state(server)
}

async fn set_config(
    State(server): State<Arc<Server>>,
    Json(req): Json<SetConfigRequest>,
) -> Result<Json<ResponseWarning>, OtgError> {
    match server.set_config(req).await {
        Ok(ack) => Ok(Json(ack)),
        Err(e) => {
            warn!(code = %e.code(), error = %e, "SetConfig rejected");
            Err(e)
        }
    }
}

async fn get_config(State(server): State<Arc<Server>>) -> Result<Json<Config>, StatusCode> {
    server
        .current_config()
        .map(|cfg| Json(cfg.as_ref().clone()))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn set_protocol_state(
    State(server): State<Arc<Server>>,
    Json(req): Json<SetProtocolStateRequest>,
) -> Result<Json<ResponseWarning>, OtgError> {
    server.set_protocol_state(req).await.map(Json)
}

async fn set_transmit_state(
    State(server): State<Arc<Server>>,
    Json(req): Json<SetTransmitStateRequest>,
) -> Result<Json<ResponseWarning>, OtgError> {
    server.set_transmit_state(req).await.map(Json)
}

async fn get_interfaces(State(server): State<Arc<Server>>) -> Json<InterfaceMap> {
    Json(server.applied_interfaces())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorCode::InvalidArgument.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::Unimplemented.status(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(ErrorCode::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_response_status() {
        let resp = OtgError::unimplemented("lags").into_response();
        assert_eq!(resp.status(), StatusCode::NOT_IMPLEMENTED);
    }
}
