use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

use alloy::primitives::{keccak256, Address};
use serde_json::Value;

use wallet_bridge_core::{
    BridgePort, CallbackRoute, Delivery, EntryPoint, PayloadFormat, PortError, RequestId,
    RpcErrorObject, RpcRequest, RpcResponse, JSONRPC_VERSION,
};

use crate::BridgeAdapterConfig;

const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INTERNAL_ERROR: i64 = -32603;

/// EIP-1193 provider bridge. Calls return immediately; provider answers are
/// queued as [`Delivery`] values that the host hands to the session.
#[derive(Debug, Clone)]
pub struct Eip1193Bridge {
    mode: ProviderMode,
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<BridgeState>,
    /// Signalled whenever an in-flight call settles.
    settled: Condvar,
}

impl Shared {
    fn new(config: &BridgeAdapterConfig) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(BridgeState::from_config(config)),
            settled: Condvar::new(),
        })
    }
}

#[derive(Debug, Clone)]
enum ProviderMode {
    Disabled(String),
    Deterministic,
    #[cfg(not(target_arch = "wasm32"))]
    Proxy(ProxyRuntime),
    #[cfg(target_arch = "wasm32")]
    Browser,
}

#[derive(Debug, Clone)]
#[cfg(not(target_arch = "wasm32"))]
struct ProxyRuntime {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[cfg(not(target_arch = "wasm32"))]
impl ProxyRuntime {
    fn post(&self, body: &Value) -> Result<Value, PortError> {
        let response = self
            .client
            .post(&self.base_url)
            .json(body)
            .send()
            .map_err(|e| PortError::Transport(format!("eip1193 proxy request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(PortError::Transport(format!(
                "eip1193 proxy status {status}: {text}"
            )));
        }
        response
            .json()
            .map_err(|e| PortError::Transport(format!("eip1193 proxy json decode failed: {e}")))
    }

    fn call(&self, method: &str, params: Value) -> Result<Value, PortError> {
        let payload = serde_json::json!({
            "jsonrpc": JSONRPC_VERSION,
            "id": 1,
            "method": method,
            "params": params,
        });
        let body = self.post(&payload)?;
        if let Some(err) = body.get("error").filter(|e| !e.is_null()) {
            return Err(PortError::Transport(format!(
                "eip1193 proxy returned error: {err}"
            )));
        }
        body.get("result")
            .cloned()
            .ok_or_else(|| PortError::Transport("eip1193 proxy missing result".to_owned()))
    }

    fn connect(&self, chain_id_hex: &str) -> ProviderOutcome {
        let account = self
            .call("eth_requestAccounts", serde_json::json!([]))
            .and_then(|accounts| first_account(&accounts));
        let account = match account {
            Ok(a) => a,
            Err(e) => return ProviderOutcome::Failure(e.into()),
        };
        if let Err(e) = self.call(
            "wallet_switchEthereumChain",
            serde_json::json!([{ "chainId": chain_id_hex }]),
        ) {
            tracing::warn!(chain_id = chain_id_hex, error = %e, "provider did not switch chain");
        }
        ProviderOutcome::Answer(account)
    }

    fn rpc(&self, request: &RpcRequest) -> ProviderOutcome {
        let body = serde_json::json!({
            "jsonrpc": JSONRPC_VERSION,
            "id": request.id,
            "method": request.method,
            "params": wire_params(&request.params),
        });
        let outcome = self
            .post(&body)
            .and_then(|body| encode_response(&normalize_response(request.id, &body)));
        match outcome {
            Ok(payload) => ProviderOutcome::Answer(payload),
            Err(e) => ProviderOutcome::Failure(e.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCall {
    Connect { chain_id: String, origin: String },
    SendRpc { request_json: String, origin: String },
}

#[derive(Debug)]
struct BridgeState {
    available: bool,
    accounts: Vec<String>,
    chain_id: String,
    balance_wei: String,
    fail_next: Option<String>,
    calls: Vec<BridgeCall>,
    deliveries: VecDeque<Delivery>,
    in_flight: usize,
}

impl BridgeState {
    fn from_config(config: &BridgeAdapterConfig) -> Self {
        Self {
            available: true,
            accounts: vec![config.deterministic_account.clone()],
            chain_id: "0x1".to_owned(),
            balance_wei: config.deterministic_balance_wei.clone(),
            fail_next: None,
            calls: Vec::new(),
            deliveries: VecDeque::new(),
            in_flight: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ProviderFailure {
    code: i64,
    message: String,
}

impl From<PortError> for ProviderFailure {
    fn from(e: PortError) -> Self {
        Self {
            code: INTERNAL_ERROR,
            message: e.to_string(),
        }
    }
}

/// Provider answer before it is shaped for an entry point. `Answer` already
/// carries the success entry's payload format.
#[derive(Debug)]
enum ProviderOutcome {
    Answer(String),
    Failure(ProviderFailure),
}

impl Default for Eip1193Bridge {
    fn default() -> Self {
        Self::with_config(BridgeAdapterConfig::from_env())
    }
}

impl Eip1193Bridge {
    pub fn with_config(config: BridgeAdapterConfig) -> Self {
        #[cfg(target_arch = "wasm32")]
        let mode = if browser_provider_available() {
            ProviderMode::Browser
        } else if config.strict_runtime_required() {
            ProviderMode::Disabled(
                "EIP-1193 browser provider not found in production runtime profile".to_owned(),
            )
        } else {
            ProviderMode::Deterministic
        };

        #[cfg(not(target_arch = "wasm32"))]
        let mode = if let Some(ref base_url) = config.eip1193_proxy_url {
            let timeout = Duration::from_millis(config.proxy_timeout_ms);
            match reqwest::blocking::Client::builder().timeout(timeout).build() {
                Ok(client) => ProviderMode::Proxy(ProxyRuntime {
                    base_url: base_url.clone(),
                    client,
                }),
                Err(e) => {
                    if config.strict_runtime_required() {
                        ProviderMode::Disabled(format!(
                            "failed to initialize EIP-1193 proxy client in production profile: {e}"
                        ))
                    } else {
                        tracing::warn!(error = %e, "proxy client unavailable, using deterministic provider");
                        ProviderMode::Deterministic
                    }
                }
            }
        } else if config.strict_runtime_required() {
            ProviderMode::Disabled(
                "EIP-1193 proxy URL not configured in production runtime profile".to_owned(),
            )
        } else {
            ProviderMode::Deterministic
        };

        let bridge = Self {
            mode,
            shared: Shared::new(&config),
        };
        tracing::debug!(mode = bridge.mode_name(), "eip1193 bridge initialized");
        bridge
    }

    /// In-process provider that answers from configured fixtures.
    pub fn deterministic(config: BridgeAdapterConfig) -> Self {
        Self {
            mode: ProviderMode::Deterministic,
            shared: Shared::new(&config),
        }
    }

    pub fn disabled(reason: &str) -> Self {
        Self {
            mode: ProviderMode::Disabled(reason.to_owned()),
            shared: Shared::new(&BridgeAdapterConfig::default()),
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self.mode {
            ProviderMode::Disabled(_) => "disabled",
            ProviderMode::Deterministic => "deterministic",
            #[cfg(not(target_arch = "wasm32"))]
            ProviderMode::Proxy(_) => "proxy",
            #[cfg(target_arch = "wasm32")]
            ProviderMode::Browser => "browser",
        }
    }

    /// Takes every queued provider answer, oldest first.
    pub fn drain_deliveries(&self) -> Result<Vec<Delivery>, PortError> {
        let mut g = lock_state(&self.shared.state)?;
        Ok(g.deliveries.drain(..).collect())
    }

    pub fn queued_deliveries(&self) -> Result<usize, PortError> {
        Ok(lock_state(&self.shared.state)?.deliveries.len())
    }

    /// Calls handed to a worker whose answer is not queued yet.
    pub fn in_flight(&self) -> Result<usize, PortError> {
        Ok(lock_state(&self.shared.state)?.in_flight)
    }

    /// Blocks until no call is in flight or `timeout` passes. Returns
    /// whether everything settled.
    pub fn wait_settled(&self, timeout: Duration) -> Result<bool, PortError> {
        let g = lock_state(&self.shared.state)?;
        let (g, _) = self
            .shared
            .settled
            .wait_timeout_while(g, timeout, |s| s.in_flight > 0)
            .map_err(|e| PortError::Transport(format!("provider lock poisoned: {e}")))?;
        Ok(g.in_flight == 0)
    }

    pub fn calls(&self) -> Result<Vec<BridgeCall>, PortError> {
        Ok(lock_state(&self.shared.state)?.calls.clone())
    }

    pub fn debug_set_available(&self, available: bool) -> Result<(), PortError> {
        lock_state(&self.shared.state)?.available = available;
        Ok(())
    }

    pub fn debug_set_accounts(&self, accounts: Vec<String>) -> Result<(), PortError> {
        lock_state(&self.shared.state)?.accounts = accounts;
        Ok(())
    }

    pub fn debug_set_balance(&self, wei_hex: &str) -> Result<(), PortError> {
        lock_state(&self.shared.state)?.balance_wei = wei_hex.to_owned();
        Ok(())
    }

    /// The next call is answered on its error entry point with `message`.
    pub fn debug_fail_next(&self, message: &str) -> Result<(), PortError> {
        lock_state(&self.shared.state)?.fail_next = Some(message.to_owned());
        Ok(())
    }

    pub fn debug_push_delivery(&self, delivery: Delivery) -> Result<(), PortError> {
        lock_state(&self.shared.state)?.deliveries.push_back(delivery);
        Ok(())
    }

    fn check_mode(&self) -> Result<(), PortError> {
        if let ProviderMode::Disabled(reason) = &self.mode {
            return Err(PortError::Policy(reason.clone()));
        }
        Ok(())
    }

    fn record_call(&self, call: BridgeCall) -> Result<(), PortError> {
        lock_state(&self.shared.state)?.calls.push(call);
        Ok(())
    }

    fn deterministic_connect(&self, chain_id_hex: &str) -> Result<ProviderOutcome, PortError> {
        let mut g = lock_state(&self.shared.state)?;
        if let Some(message) = g.fail_next.take() {
            return Ok(ProviderOutcome::Failure(ProviderFailure {
                code: INTERNAL_ERROR,
                message,
            }));
        }
        let Some(account) = g.accounts.first().cloned() else {
            return Ok(ProviderOutcome::Failure(ProviderFailure {
                code: 4100,
                message: "no accounts available; unlock wallet".to_owned(),
            }));
        };
        g.chain_id = chain_id_hex.to_owned();
        Ok(ProviderOutcome::Answer(account))
    }

    fn deterministic_rpc(
        &self,
        request: &RpcRequest,
        request_json: &str,
    ) -> Result<ProviderOutcome, PortError> {
        let mut g = lock_state(&self.shared.state)?;
        if let Some(message) = g.fail_next.take() {
            return Ok(ProviderOutcome::Failure(ProviderFailure {
                code: INTERNAL_ERROR,
                message,
            }));
        }
        let id = request.id;
        let response = match request.method.as_str() {
            "eth_getBalance" => RpcResponse::success(id, g.balance_wei.clone()),
            "eth_chainId" => RpcResponse::success(id, g.chain_id.clone()),
            "net_version" => RpcResponse::success(
                id,
                parse_chain_id_str(&g.chain_id)
                    .map(|n| n.to_string())
                    .unwrap_or_default(),
            ),
            "eth_accounts" | "eth_requestAccounts" => RpcResponse::success(
                id,
                serde_json::to_string(&g.accounts)
                    .map_err(|e| PortError::Validation(format!("accounts encode failed: {e}")))?,
            ),
            "eth_sendTransaction" => {
                RpcResponse::success(id, keccak256(request_json.as_bytes()).to_string())
            }
            other => RpcResponse::failure(
                id,
                METHOD_NOT_FOUND,
                format!("the method {other} does not exist/is not available"),
            ),
        };
        Ok(ProviderOutcome::Answer(encode_response(&response)?))
    }

    /// Runs `work` on a worker thread and queues its outcome on `route`.
    #[cfg(not(target_arch = "wasm32"))]
    fn spawn_proxy<F>(&self, route: &CallbackRoute, id: RequestId, work: F) -> Result<(), PortError>
    where
        F: FnOnce() -> ProviderOutcome + Send + 'static,
    {
        lock_state(&self.shared.state)?.in_flight += 1;
        let shared = Arc::clone(&self.shared);
        let worker_route = route.clone();
        let spawned = std::thread::Builder::new()
            .name("eip1193-proxy".to_owned())
            .spawn(move || {
                let outcome = work();
                settle(&shared, &worker_route, id, outcome);
            });
        if let Err(e) = spawned {
            let mut g = lock_state(&self.shared.state)?;
            g.in_flight = g.in_flight.saturating_sub(1);
            self.shared.settled.notify_all();
            return Err(PortError::Transport(format!(
                "failed to start eip1193 proxy worker: {e}"
            )));
        }
        Ok(())
    }

    #[cfg(target_arch = "wasm32")]
    fn browser_connect(&self, chain_id_hex: &str, route: &CallbackRoute) {
        let shared = Arc::clone(&self.shared);
        let route = route.clone();
        let chain_id = chain_id_hex.to_owned();
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = match wasm_request("eth_requestAccounts", serde_json::json!([])).await {
                Ok(value) => match first_account(&value) {
                    Ok(account) => {
                        if let Err(e) = wasm_request(
                            "wallet_switchEthereumChain",
                            serde_json::json!([{ "chainId": chain_id }]),
                        )
                        .await
                        {
                            tracing::warn!(chain_id = %chain_id, error = %e.message, "provider did not switch chain");
                        }
                        ProviderOutcome::Answer(account)
                    }
                    Err(e) => ProviderOutcome::Failure(e.into()),
                },
                Err(failure) => ProviderOutcome::Failure(failure),
            };
            push_outcome(&shared, &route, 0, outcome);
        });
    }

    #[cfg(target_arch = "wasm32")]
    fn browser_rpc(&self, request: RpcRequest, route: &CallbackRoute) {
        let shared = Arc::clone(&self.shared);
        let route = route.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let id = request.id;
            let outcome = match wasm_request(&request.method, wire_params(&request.params)).await {
                Ok(result) => {
                    let response = RpcResponse {
                        jsonrpc: JSONRPC_VERSION.to_owned(),
                        result: stringify_result(&result),
                        id,
                        error: None,
                    };
                    match encode_response(&response) {
                        Ok(payload) => ProviderOutcome::Answer(payload),
                        Err(e) => ProviderOutcome::Failure(e.into()),
                    }
                }
                Err(failure) => ProviderOutcome::Failure(failure),
            };
            push_outcome(&shared, &route, id, outcome);
        });
    }
}

impl BridgePort for Eip1193Bridge {
    fn is_available(&self) -> bool {
        match &self.mode {
            ProviderMode::Disabled(_) => false,
            ProviderMode::Deterministic => {
                lock_state(&self.shared.state).map(|g| g.available).unwrap_or(false)
            }
            #[cfg(not(target_arch = "wasm32"))]
            ProviderMode::Proxy(_) => true,
            #[cfg(target_arch = "wasm32")]
            ProviderMode::Browser => browser_provider_available(),
        }
    }

    fn connect(&self, chain_id_hex: &str, route: &CallbackRoute) -> Result<(), PortError> {
        self.check_mode()?;
        self.record_call(BridgeCall::Connect {
            chain_id: chain_id_hex.to_owned(),
            origin: route.origin.clone(),
        })?;

        let outcome = match &self.mode {
            ProviderMode::Disabled(reason) => return Err(PortError::Policy(reason.clone())),
            ProviderMode::Deterministic => self.deterministic_connect(chain_id_hex)?,
            #[cfg(not(target_arch = "wasm32"))]
            ProviderMode::Proxy(proxy) => {
                let proxy = proxy.clone();
                let chain_id = chain_id_hex.to_owned();
                return self.spawn_proxy(route, 0, move || proxy.connect(&chain_id));
            }
            #[cfg(target_arch = "wasm32")]
            ProviderMode::Browser => {
                self.browser_connect(chain_id_hex, route);
                return Ok(());
            }
        };
        push_outcome(&self.shared, route, 0, outcome);
        Ok(())
    }

    fn send_rpc(&self, request_json: &str, route: &CallbackRoute) -> Result<(), PortError> {
        self.check_mode()?;
        self.record_call(BridgeCall::SendRpc {
            request_json: request_json.to_owned(),
            origin: route.origin.clone(),
        })?;

        let request: RpcRequest = match serde_json::from_str(request_json) {
            Ok(r) => r,
            Err(e) => {
                let failure = ProviderFailure {
                    code: INVALID_REQUEST,
                    message: format!("invalid request: {e}"),
                };
                push_outcome(&self.shared, route, 0, ProviderOutcome::Failure(failure));
                return Ok(());
            }
        };

        let outcome = match &self.mode {
            ProviderMode::Disabled(reason) => return Err(PortError::Policy(reason.clone())),
            ProviderMode::Deterministic => self.deterministic_rpc(&request, request_json)?,
            #[cfg(not(target_arch = "wasm32"))]
            ProviderMode::Proxy(proxy) => {
                let proxy = proxy.clone();
                let id = request.id;
                return self.spawn_proxy(route, id, move || proxy.rpc(&request));
            }
            #[cfg(target_arch = "wasm32")]
            ProviderMode::Browser => {
                self.browser_rpc(request, route);
                return Ok(());
            }
        };
        push_outcome(&self.shared, route, request.id, outcome);
        Ok(())
    }
}

fn lock_state(state: &Mutex<BridgeState>) -> Result<MutexGuard<'_, BridgeState>, PortError> {
    state
        .lock()
        .map_err(|e| PortError::Transport(format!("provider lock poisoned: {e}")))
}

fn push_outcome(shared: &Shared, route: &CallbackRoute, id: RequestId, outcome: ProviderOutcome) {
    queue_outcome(shared, route, id, outcome, false);
}

/// Queues the answer of a worker call and releases its in-flight slot.
#[cfg(not(target_arch = "wasm32"))]
fn settle(shared: &Shared, route: &CallbackRoute, id: RequestId, outcome: ProviderOutcome) {
    queue_outcome(shared, route, id, outcome, true);
}

fn queue_outcome(
    shared: &Shared,
    route: &CallbackRoute,
    id: RequestId,
    outcome: ProviderOutcome,
    was_in_flight: bool,
) {
    let (entry, payload) = match outcome {
        ProviderOutcome::Answer(payload) => (route.success, payload),
        ProviderOutcome::Failure(failure) => (route.error, error_payload(route.error, id, failure)),
    };
    match lock_state(&shared.state) {
        Ok(mut g) => {
            tracing::debug!(origin = %route.origin, ?entry, id, "provider answer queued");
            g.deliveries.push_back(Delivery {
                origin: route.origin.clone(),
                entry,
                payload,
            });
            if was_in_flight {
                g.in_flight = g.in_flight.saturating_sub(1);
            }
        }
        Err(e) => tracing::error!(error = %e, ?entry, "provider answer lost"),
    }
    shared.settled.notify_all();
}

fn error_payload(entry: EntryPoint, id: RequestId, failure: ProviderFailure) -> String {
    match entry.payload_format() {
        PayloadFormat::Text => failure.message,
        PayloadFormat::Json => {
            let response = RpcResponse::failure(id, failure.code, failure.message.clone());
            serde_json::to_string(&response).unwrap_or(failure.message)
        }
    }
}

fn encode_response(response: &RpcResponse) -> Result<String, PortError> {
    serde_json::to_string(response)
        .map_err(|e| PortError::Validation(format!("response encode failed: {e}")))
}

/// Reshapes an arbitrary JSON-RPC reply into the string-result wire shape.
fn normalize_response(fallback_id: RequestId, body: &Value) -> RpcResponse {
    let error = body.get("error").filter(|e| !e.is_null()).map(|e| RpcErrorObject {
        message: e
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| e.to_string()),
        code: e.get("code").and_then(Value::as_i64).unwrap_or(INTERNAL_ERROR),
    });
    RpcResponse {
        jsonrpc: body
            .get("jsonrpc")
            .and_then(Value::as_str)
            .unwrap_or(JSONRPC_VERSION)
            .to_owned(),
        result: body.get("result").and_then(stringify_result),
        id: body.get("id").and_then(Value::as_u64).unwrap_or(fallback_id),
        error,
    }
}

fn stringify_result(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// String params that hold a JSON object (e.g. a transaction) go out as objects.
fn wire_params(params: &[String]) -> Value {
    Value::Array(
        params
            .iter()
            .map(|p| match serde_json::from_str::<Value>(p) {
                Ok(obj @ Value::Object(_)) => obj,
                _ => Value::String(p.clone()),
            })
            .collect(),
    )
}

fn first_account(value: &Value) -> Result<String, PortError> {
    let raw = value
        .as_array()
        .and_then(|arr| arr.first())
        .and_then(Value::as_str)
        .ok_or_else(|| PortError::NotFound("provider returned no accounts".to_owned()))?;
    raw.parse::<Address>()
        .map_err(|e| PortError::Validation(format!("invalid account address: {e}")))?;
    Ok(raw.to_owned())
}

fn parse_chain_id_str(raw: &str) -> Result<u64, PortError> {
    if raw.starts_with("0x") || raw.starts_with("0X") {
        u64::from_str_radix(&raw[2..], 16)
            .map_err(|e| PortError::Validation(format!("invalid hex chain id: {e}")))
    } else {
        raw.parse()
            .map_err(|e| PortError::Validation(format!("invalid chain id: {e}")))
    }
}

#[cfg(target_arch = "wasm32")]
fn browser_provider_available() -> bool {
    browser_provider().is_ok()
}

#[cfg(target_arch = "wasm32")]
fn browser_provider() -> Result<wasm_bindgen::JsValue, PortError> {
    let window =
        web_sys::window().ok_or_else(|| PortError::Transport("missing window".to_owned()))?;
    let provider = get_prop(&window.into(), "ethereum")?;
    if provider.is_null() || provider.is_undefined() {
        return Err(PortError::NotFound("window.ethereum missing".to_owned()));
    }
    Ok(provider)
}

#[cfg(target_arch = "wasm32")]
fn get_prop(target: &wasm_bindgen::JsValue, key: &str) -> Result<wasm_bindgen::JsValue, PortError> {
    js_sys::Reflect::get(target, &wasm_bindgen::JsValue::from_str(key))
        .map_err(|e| PortError::Transport(format!("read provider property {key} failed: {e:?}")))
}

#[cfg(target_arch = "wasm32")]
async fn wasm_request(method: &str, params: Value) -> Result<Value, ProviderFailure> {
    use wasm_bindgen::JsCast;

    let provider = browser_provider()?;
    let request_fn = get_prop(&provider, "request")
        .ok()
        .and_then(|v| v.dyn_into::<js_sys::Function>().ok())
        .ok_or(PortError::NotImplemented(
            "window.ethereum.request is unavailable",
        ))?;

    let request = serde_json::json!({
        "method": method,
        "params": params,
    });
    let request_js = serde_wasm_bindgen::to_value(&request)
        .map_err(|e| PortError::Transport(format!("failed to encode wasm request: {e}")))?;
    let promise_js = request_fn
        .call1(&provider, &request_js)
        .map_err(|e| PortError::Transport(format!("provider request dispatch failed: {e:?}")))?;
    let promise = promise_js
        .dyn_into::<js_sys::Promise>()
        .map_err(|_| PortError::Transport("provider request did not return Promise".to_owned()))?;
    let result_js = wasm_bindgen_futures::JsFuture::from(promise)
        .await
        .map_err(rejection_to_failure)?;
    if result_js.is_null() || result_js.is_undefined() {
        return Ok(Value::Null);
    }
    serde_wasm_bindgen::from_value(result_js)
        .map_err(|e| PortError::Transport(format!("failed to decode wasm response: {e}")).into())
}

#[cfg(target_arch = "wasm32")]
fn rejection_to_failure(err: wasm_bindgen::JsValue) -> ProviderFailure {
    let code = get_prop(&err, "code")
        .ok()
        .and_then(|v| v.as_f64())
        .map(|n| n as i64)
        .unwrap_or(INTERNAL_ERROR);
    let message = get_prop(&err, "message")
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_else(|| format!("provider request rejected: {err:?}"));
    ProviderFailure { code, message }
}
