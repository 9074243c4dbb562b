use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortError {
    #[error("port not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("policy error: {0}")]
    Policy(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("wallet provider is not available")]
    ProviderUnavailable,
}

/// Entry points the bridge may call back into. The set is closed: a bridge
/// is handed two of these per call and never addresses handlers by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryPoint {
    ConnectionSuccess,
    ConnectionError,
    BalanceSuccess,
    BalanceError,
    RpcSuccess,
    RpcError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// A serialized `RpcResponse`.
    Json,
    /// A bare address or error message.
    Text,
}

impl EntryPoint {
    pub fn payload_format(self) -> PayloadFormat {
        match self {
            EntryPoint::BalanceSuccess | EntryPoint::RpcSuccess | EntryPoint::RpcError => {
                PayloadFormat::Json
            }
            EntryPoint::ConnectionSuccess
            | EntryPoint::ConnectionError
            | EntryPoint::BalanceError => PayloadFormat::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackRoute {
    pub origin: String,
    pub success: EntryPoint,
    pub error: EntryPoint,
}

impl CallbackRoute {
    pub fn connection(origin: &str) -> Self {
        Self {
            origin: origin.to_owned(),
            success: EntryPoint::ConnectionSuccess,
            error: EntryPoint::ConnectionError,
        }
    }

    pub fn balance(origin: &str) -> Self {
        Self {
            origin: origin.to_owned(),
            success: EntryPoint::BalanceSuccess,
            error: EntryPoint::BalanceError,
        }
    }

    pub fn rpc(origin: &str) -> Self {
        Self {
            origin: origin.to_owned(),
            success: EntryPoint::RpcSuccess,
            error: EntryPoint::RpcError,
        }
    }
}

/// One callback invocation handed back by a bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub origin: String,
    pub entry: EntryPoint,
    pub payload: String,
}

/// Fire-and-forget surface of the external wallet provider. Results come
/// back later as `Delivery` values routed by `CallbackRoute`.
pub trait BridgePort {
    fn is_available(&self) -> bool;
    fn connect(&self, chain_id_hex: &str, route: &CallbackRoute) -> Result<(), PortError>;
    fn send_rpc(&self, request_json: &str, route: &CallbackRoute) -> Result<(), PortError>;
}
