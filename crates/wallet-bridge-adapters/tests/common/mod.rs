#![allow(dead_code)]

use std::io::Read;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::{json, Value};
use tiny_http::{Response, Server, StatusCode};

use wallet_bridge_adapters::{BridgeAdapterConfig, Eip1193Bridge};
use wallet_bridge_core::{NetworkConfig, SessionEvent, WalletSession};

pub type TestSession = WalletSession<Eip1193Bridge>;

pub fn deterministic_session() -> (TestSession, Receiver<SessionEvent>) {
    session_with(Eip1193Bridge::deterministic(BridgeAdapterConfig::default()))
}

pub fn session_with(bridge: Eip1193Bridge) -> (TestSession, Receiver<SessionEvent>) {
    let session = WalletSession::init(bridge, NetworkConfig::default());
    let (_, rx) = session.events().subscribe_channel().expect("subscribe");
    (session, rx)
}

/// Waits for worker calls to settle, then hands every queued provider
/// answer to the session.
pub fn pump(session: &TestSession) -> usize {
    assert!(
        session
            .bridge
            .wait_settled(Duration::from_secs(10))
            .expect("wait for provider"),
        "provider calls did not settle"
    );
    let deliveries = session.bridge.drain_deliveries().expect("drain deliveries");
    session.deliver_all(deliveries)
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

pub fn account() -> &'static str {
    "0x1000000000000000000000000000000000000001"
}

/// JSON-RPC provider stand-in. Records each method it is asked for.
pub fn spawn_mock_provider(
    methods: Arc<Mutex<Vec<String>>>,
) -> (String, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").expect("start server");
    let addr = format!("http://{}", server.server_addr());

    let join = thread::spawn(move || {
        for _ in 0..16 {
            let mut req = match server.recv() {
                Ok(r) => r,
                Err(_) => break,
            };
            let mut raw = String::new();
            if req.as_reader().read_to_string(&mut raw).is_err() {
                let _ = req.respond(Response::from_string("").with_status_code(StatusCode(400)));
                continue;
            }
            let body: Value = serde_json::from_str(&raw).unwrap_or(Value::Null);
            let method = body["method"].as_str().unwrap_or_default().to_owned();
            let id = body["id"].clone();
            if let Ok(mut g) = methods.lock() {
                g.push(method.clone());
            }

            let (code, payload) = match method.as_str() {
                "eth_requestAccounts" => (
                    200,
                    json!({"jsonrpc":"2.0","id":id,"result":[account()]}),
                ),
                "wallet_switchEthereumChain" => {
                    (200, json!({"jsonrpc":"2.0","id":id,"result":null}))
                }
                "eth_getBalance" => (
                    200,
                    json!({"jsonrpc":"2.0","id":id,"result":"0x0de0b6b3a7640000"}),
                ),
                "eth_getBlockByNumber" => (
                    200,
                    json!({"jsonrpc":"2.0","id":id,"result":{"number":"0x10"}}),
                ),
                "eth_blockNumber" => {
                    thread::sleep(Duration::from_millis(300));
                    (200, json!({"jsonrpc":"2.0","id":id,"result":"0x10"}))
                }
                "eth_sign" => (
                    200,
                    json!({"jsonrpc":"2.0","id":id,"error":{"code":4001,"message":"User rejected the request."}}),
                ),
                _ => (500, json!({"error":"unsupported"})),
            };
            let response =
                Response::from_string(payload.to_string()).with_status_code(StatusCode(code));
            let _ = req.respond(response);
        }
    });

    (addr, join)
}

pub fn proxy_config(base_url: &str) -> BridgeAdapterConfig {
    BridgeAdapterConfig {
        eip1193_proxy_url: Some(base_url.to_owned()),
        proxy_timeout_ms: 5_000,
        ..BridgeAdapterConfig::default()
    }
}
