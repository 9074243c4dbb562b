#![allow(dead_code)]

use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};

use wallet_bridge_core::{
    BridgePort, CallbackRoute, NetworkConfig, PortError, RpcRequest, SessionEvent, WalletSession,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCall {
    Connect {
        chain_id: String,
        route: CallbackRoute,
    },
    SendRpc {
        request_json: String,
        route: CallbackRoute,
    },
}

/// Bridge double that records calls and never answers on its own.
#[derive(Debug, Default)]
pub struct RecordingBridge {
    unavailable: bool,
    fail_with: Option<String>,
    calls: Mutex<Vec<BridgeCall>>,
}

impl RecordingBridge {
    pub fn available() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_owned()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<BridgeCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn sent_requests(&self) -> Vec<RpcRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                BridgeCall::SendRpc { request_json, .. } => {
                    Some(serde_json::from_str(&request_json).expect("request json"))
                }
                BridgeCall::Connect { .. } => None,
            })
            .collect()
    }

    pub fn last_request(&self) -> RpcRequest {
        self.sent_requests().pop().expect("at least one request sent")
    }
}

impl BridgePort for RecordingBridge {
    fn is_available(&self) -> bool {
        !self.unavailable
    }

    fn connect(&self, chain_id_hex: &str, route: &CallbackRoute) -> Result<(), PortError> {
        if let Some(message) = &self.fail_with {
            return Err(PortError::Transport(message.clone()));
        }
        self.calls.lock().expect("calls lock").push(BridgeCall::Connect {
            chain_id: chain_id_hex.to_owned(),
            route: route.clone(),
        });
        Ok(())
    }

    fn send_rpc(&self, request_json: &str, route: &CallbackRoute) -> Result<(), PortError> {
        if let Some(message) = &self.fail_with {
            return Err(PortError::Transport(message.clone()));
        }
        self.calls.lock().expect("calls lock").push(BridgeCall::SendRpc {
            request_json: request_json.to_owned(),
            route: route.clone(),
        });
        Ok(())
    }
}

pub fn new_session(bridge: RecordingBridge) -> (WalletSession<RecordingBridge>, Receiver<SessionEvent>) {
    let session = WalletSession::init(bridge, NetworkConfig::default());
    let (_, rx) = session.events().subscribe_channel().expect("subscribe");
    (session, rx)
}

pub fn drain(rx: &Receiver<SessionEvent>) -> Vec<SessionEvent> {
    rx.try_iter().collect()
}

pub fn error_messages(events: &[SessionEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::Error { message, .. } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn logged(log: &CallLog) -> Vec<String> {
    log.lock().expect("log lock").clone()
}

pub fn account() -> &'static str {
    "0x1000000000000000000000000000000000000001"
}
