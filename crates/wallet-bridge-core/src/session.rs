use std::sync::{Mutex, MutexGuard};

use crate::balance::format_balance;
use crate::domain::{
    BalanceResult, NetworkConfig, RequestId, RpcRequest, RpcResponse, SessionState,
    TransactionRequest, WalletConnectionResult,
};
use crate::events::{ErrorKind, EventBus, SessionEvent, SubscriptionId};
use crate::pending::{IdAllocator, PendingEntry, PendingRequestTable};
use crate::ports::{BridgePort, CallbackRoute, Delivery, EntryPoint, PortError};
use crate::state_machine::{session_transition, SessionAction, SessionStatus};

pub const DEFAULT_ORIGIN: &str = "wallet-bridge";
pub const SHUTDOWN_MESSAGE: &str = "Session shutting down";

/// Wallet session over an external bridge. Outbound calls return as soon as
/// the bridge accepts them; answers re-enter through [`WalletSession::dispatch`].
pub struct WalletSession<B>
where
    B: BridgePort,
{
    pub bridge: B,
    origin: String,
    network: NetworkConfig,
    events: EventBus,
    inner: Mutex<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    state: SessionState,
    status: SessionStatus,
    ids: IdAllocator,
    pending: PendingRequestTable,
    default_chain_id: String,
    requested_chain_id: Option<String>,
    unmatched_responses: u64,
    shut_down: bool,
}

impl<B> WalletSession<B>
where
    B: BridgePort,
{
    pub fn init(bridge: B, network: NetworkConfig) -> Self {
        Self::init_with_origin(bridge, network, DEFAULT_ORIGIN)
    }

    pub fn init_with_origin(bridge: B, network: NetworkConfig, origin: &str) -> Self {
        let default_chain_id = network.hex_chain_id();
        tracing::debug!(origin, network = %network.display_name(), "wallet session initialized");
        Self {
            bridge,
            origin: origin.to_owned(),
            network,
            events: EventBus::default(),
            inner: Mutex::new(SessionInner {
                state: SessionState::default(),
                status: SessionStatus::Disconnected,
                ids: IdAllocator::default(),
                pending: PendingRequestTable::default(),
                default_chain_id,
                requested_chain_id: None,
                unmatched_responses: 0,
                shut_down: false,
            }),
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe<F>(&self, handler: F) -> Result<SubscriptionId, PortError>
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<bool, PortError> {
        self.events.unsubscribe(id)
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    pub fn connect(&self, chain_id_hex: Option<&str>) -> Result<(), PortError> {
        self.ensure_active()?;
        if !self.bridge.is_available() {
            self.emit(SessionEvent::error(
                ErrorKind::ProviderUnavailable,
                "Wallet provider is not available",
            ));
            return Err(PortError::ProviderUnavailable);
        }

        let chain_id = {
            let mut g = self.lock()?;
            let chain_id = chain_id_hex
                .map(str::to_owned)
                .unwrap_or_else(|| g.default_chain_id.clone());
            g.requested_chain_id = Some(chain_id.clone());
            apply_transition(&mut g, SessionAction::Connect);
            chain_id
        };

        tracing::info!(chain_id = %chain_id, "requesting wallet connection");
        if let Err(e) = self
            .bridge
            .connect(&chain_id, &CallbackRoute::connection(&self.origin))
        {
            match self.lock() {
                Ok(mut g) => apply_transition(&mut g, SessionAction::ConnectFailed),
                Err(lock_err) => tracing::error!(error = %lock_err, "connect failure not recorded"),
            }
            self.emit(SessionEvent::error(
                ErrorKind::Transport,
                format!("Wallet connection failed: {e}"),
            ));
            return Err(e);
        }
        Ok(())
    }

    /// Always clears the session and always notifies, even when already
    /// disconnected.
    pub fn disconnect(&self) -> Result<(), PortError> {
        {
            let mut g = self.lock()?;
            g.state = SessionState::default();
            apply_transition(&mut g, SessionAction::Disconnect);
        }
        tracing::info!("wallet disconnected");
        self.emit(SessionEvent::WalletDisconnected("Disconnected".to_owned()));
        Ok(())
    }

    /// Requests the balance of `address`, or of the connected account.
    pub fn get_balance(&self, address: Option<&str>) -> Result<RequestId, PortError> {
        self.ensure_active()?;
        let (target, id) = {
            let mut g = self.lock()?;
            let target = address
                .map(str::to_owned)
                .or_else(|| g.state.address.clone())
                .filter(|a| !a.is_empty());
            let Some(target) = target else {
                drop(g);
                self.emit(SessionEvent::error(
                    ErrorKind::MissingAddress,
                    "No address available",
                ));
                return Err(PortError::NotFound("no address available".to_owned()));
            };
            let SessionInner { ids, pending, .. } = &mut *g;
            (target, ids.next_free(pending))
        };

        let request = RpcRequest::new(
            "eth_getBalance",
            vec![target.clone(), "latest".to_owned()],
            id,
        );
        let json = serialize_request(&request)?;
        tracing::debug!(id, address = %target, "requesting balance");
        if let Err(e) = self
            .bridge
            .send_rpc(&json, &CallbackRoute::balance(&self.origin))
        {
            self.emit(SessionEvent::error(
                ErrorKind::Transport,
                format!("Balance request failed: {e}"),
            ));
            return Err(e);
        }
        Ok(id)
    }

    pub fn send_rpc<S, E>(
        &self,
        method: &str,
        params: Vec<String>,
        on_success: S,
        on_error: E,
    ) -> Result<RequestId, PortError>
    where
        S: FnOnce(RpcResponse) + Send + 'static,
        E: FnOnce(String) + Send + 'static,
    {
        self.ensure_active()?;
        let id = {
            let mut g = self.lock()?;
            let SessionInner { ids, pending, .. } = &mut *g;
            let id = ids.next_free(pending);
            debug_assert!(!pending.contains(id), "allocator returned a pending id");
            id
        };
        self.send_request(RpcRequest::new(method, params, id), on_success, on_error)
    }

    /// Sends a caller-built request. Its id must not already be pending.
    pub fn send_request<S, E>(
        &self,
        request: RpcRequest,
        on_success: S,
        on_error: E,
    ) -> Result<RequestId, PortError>
    where
        S: FnOnce(RpcResponse) + Send + 'static,
        E: FnOnce(String) + Send + 'static,
    {
        self.ensure_active()?;
        let id = request.id;
        let json = serialize_request(&request)?;
        self.lock()?
            .pending
            .register(id, Box::new(on_success), Box::new(on_error))?;

        tracing::debug!(id, method = %request.method, "rpc request dispatched to bridge");
        if let Err(e) = self.bridge.send_rpc(&json, &CallbackRoute::rpc(&self.origin)) {
            // bridge never saw the call; the entry cannot be answered
            match self.lock() {
                Ok(mut g) => {
                    g.pending.take(id);
                }
                Err(lock_err) => tracing::error!(id, error = %lock_err, "pending entry not released"),
            }
            return Err(e);
        }
        Ok(id)
    }

    pub fn send_transaction<S, E>(
        &self,
        to: &str,
        value: &str,
        data: Option<&str>,
        on_success: S,
        on_error: E,
    ) -> Result<RequestId, PortError>
    where
        S: FnOnce(RpcResponse) + Send + 'static,
        E: FnOnce(String) + Send + 'static,
    {
        let tx = TransactionRequest {
            to: to.to_owned(),
            value: value.to_owned(),
            data: data.unwrap_or("0x").to_owned(),
        };
        let encoded = serde_json::to_string(&tx)
            .map_err(|e| PortError::Validation(format!("transaction serialization failed: {e}")))?;
        self.send_rpc("eth_sendTransaction", vec![encoded], on_success, on_error)
    }

    pub fn deliver(&self, delivery: Delivery) {
        if delivery.origin != self.origin {
            tracing::warn!(
                origin = %delivery.origin,
                expected = %self.origin,
                entry = ?delivery.entry,
                "dropping delivery addressed to another origin"
            );
            return;
        }
        self.dispatch(delivery.entry, &delivery.payload);
    }

    pub fn deliver_all<I>(&self, deliveries: I) -> usize
    where
        I: IntoIterator<Item = Delivery>,
    {
        let mut count = 0;
        for delivery in deliveries {
            self.deliver(delivery);
            count += 1;
        }
        count
    }

    pub fn dispatch(&self, entry: EntryPoint, payload: &str) {
        match self.lock() {
            Ok(g) if g.shut_down => {
                tracing::debug!(?entry, "session shut down, dropping bridge callback");
                return;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(?entry, error = %e, "bridge callback dropped");
                return;
            }
        }
        match entry {
            EntryPoint::ConnectionSuccess => self.on_connection_success(payload),
            EntryPoint::ConnectionError => self.on_connection_error(payload),
            EntryPoint::BalanceSuccess => self.on_balance_success(payload),
            EntryPoint::BalanceError => self.on_balance_error(payload),
            EntryPoint::RpcSuccess => self.on_rpc_success(payload),
            EntryPoint::RpcError => self.on_rpc_error(payload),
        }
    }

    pub fn on_connection_success(&self, address: &str) {
        if address.is_empty() {
            self.on_connection_error("provider returned no address");
            return;
        }
        let chain_id = {
            let mut g = match self.lock() {
                Ok(g) => g,
                Err(e) => return self.report_internal(e),
            };
            let chain_id = g
                .requested_chain_id
                .clone()
                .unwrap_or_else(|| g.default_chain_id.clone());
            g.state.address = Some(address.to_owned());
            g.state.chain_id = Some(chain_id.clone());
            apply_transition(&mut g, SessionAction::ConnectSucceeded);
            chain_id
        };
        tracing::info!(address, chain_id = %chain_id, "wallet connected");
        self.emit(SessionEvent::WalletConnected(WalletConnectionResult {
            success: true,
            address: Some(address.to_owned()),
            chain_id: Some(chain_id),
            error: None,
        }));
    }

    pub fn on_connection_error(&self, message: &str) {
        match self.lock() {
            Ok(mut g) => apply_transition(&mut g, SessionAction::ConnectFailed),
            Err(e) => return self.report_internal(e),
        }
        self.emit(SessionEvent::error(
            ErrorKind::Transport,
            format!("Wallet connection failed: {message}"),
        ));
    }

    pub fn on_balance_success(&self, payload: &str) {
        let response: RpcResponse = match serde_json::from_str(payload) {
            Ok(r) => r,
            Err(e) => {
                return self.emit(SessionEvent::error(
                    ErrorKind::PayloadParse,
                    format!("Failed to parse balance response: {e}"),
                ))
            }
        };

        if let Some(err) = response.effective_error() {
            return self.emit(SessionEvent::error(
                ErrorKind::Application,
                err.message.clone(),
            ));
        }

        match response.effective_result() {
            Some(raw) => {
                let balance = format_balance(raw, &self.network);
                tracing::debug!(id = response.id, raw, formatted = %balance.formatted, "balance received");
                self.emit(SessionEvent::BalanceReceived(BalanceResult {
                    success: true,
                    balance: raw.to_owned(),
                    formatted_balance: balance.formatted,
                    currency_symbol: balance.symbol,
                    error: None,
                }));
            }
            None => self.emit(SessionEvent::error(
                ErrorKind::MissingResult,
                "No result in RPC response",
            )),
        }
    }

    pub fn on_balance_error(&self, message: &str) {
        self.emit(SessionEvent::error(
            ErrorKind::Transport,
            format!("Balance request failed: {message}"),
        ));
    }

    pub fn on_rpc_success(&self, payload: &str) {
        let response: RpcResponse = match serde_json::from_str(payload) {
            Ok(r) => r,
            Err(e) => {
                return self.emit(SessionEvent::error(
                    ErrorKind::PayloadParse,
                    format!("Failed to parse RPC response: {e}"),
                ))
            }
        };
        match self.take_pending(response.id) {
            Ok(Some(entry)) => (entry.on_success)(response),
            Ok(None) => self.report_unmatched(response.id),
            Err(e) => self.report_internal(e),
        }
    }

    pub fn on_rpc_error(&self, payload: &str) {
        let response: RpcResponse = match serde_json::from_str(payload) {
            Ok(r) => r,
            Err(e) => {
                return self.emit(SessionEvent::error(
                    ErrorKind::PayloadParse,
                    format!("Failed to parse RPC error: {e} (payload: {payload})"),
                ))
            }
        };
        let message = response
            .effective_error()
            .map(|err| err.message.clone())
            .unwrap_or_else(|| "Unknown error".to_owned());
        match self.take_pending(response.id) {
            Ok(Some(entry)) => (entry.on_error)(message),
            Ok(None) => self.report_unmatched(response.id),
            Err(e) => self.report_internal(e),
        }
    }

    /// Clears subscriptions and fails every pending request. Returns how many
    /// requests were failed; a second call returns 0.
    pub fn shutdown(&self) -> Result<usize, PortError> {
        let drained = {
            let mut g = self.lock()?;
            g.shut_down = true;
            g.pending.drain()
        };
        let count = drained.len();
        for (id, entry) in drained {
            tracing::debug!(id, "failing pending request on shutdown");
            (entry.on_error)(SHUTDOWN_MESSAGE.to_owned());
        }
        self.events.clear()?;
        tracing::info!(failed_requests = count, "wallet session shut down");
        Ok(count)
    }

    pub fn is_connected(&self) -> bool {
        self.lock().map(|g| g.state.is_connected()).unwrap_or(false)
    }

    pub fn current_address(&self) -> Option<String> {
        self.lock().ok().and_then(|g| g.state.address.clone())
    }

    pub fn current_chain_id(&self) -> Option<String> {
        self.lock().ok().and_then(|g| g.state.chain_id.clone())
    }

    pub fn state(&self) -> Result<SessionState, PortError> {
        Ok(self.lock()?.state.clone())
    }

    pub fn status(&self) -> Result<SessionStatus, PortError> {
        Ok(self.lock()?.status)
    }

    pub fn pending_count(&self) -> usize {
        self.lock().map(|g| g.pending.len()).unwrap_or(0)
    }

    pub fn unmatched_responses(&self) -> u64 {
        self.lock().map(|g| g.unmatched_responses).unwrap_or(0)
    }

    pub fn is_shut_down(&self) -> bool {
        self.lock().map(|g| g.shut_down).unwrap_or(true)
    }

    pub fn default_chain_id(&self) -> Result<String, PortError> {
        Ok(self.lock()?.default_chain_id.clone())
    }

    pub fn set_default_chain_id(&self, chain_id_hex: &str) -> Result<(), PortError> {
        self.lock()?.default_chain_id = chain_id_hex.to_owned();
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionInner>, PortError> {
        self.inner
            .lock()
            .map_err(|e| PortError::Transport(format!("session lock poisoned: {e}")))
    }

    fn ensure_active(&self) -> Result<(), PortError> {
        if self.lock()?.shut_down {
            return Err(PortError::Policy("session is shut down".to_owned()));
        }
        Ok(())
    }

    fn take_pending(&self, id: RequestId) -> Result<Option<PendingEntry>, PortError> {
        Ok(self.lock()?.pending.take(id))
    }

    fn report_unmatched(&self, id: RequestId) {
        if let Ok(mut g) = self.lock() {
            g.unmatched_responses = g.unmatched_responses.saturating_add(1);
        }
        tracing::warn!(id, "rpc response has no pending request");
        self.emit(SessionEvent::error(
            ErrorKind::UnmatchedResponse,
            format!("No pending request for response id {id}"),
        ));
    }

    fn report_internal(&self, e: PortError) {
        tracing::error!(error = %e, "bridge callback failed");
    }

    fn emit(&self, event: SessionEvent) {
        if let SessionEvent::Error { kind, message } = &event {
            tracing::debug!(?kind, %message, "session error event");
        }
        if let Err(e) = self.events.emit(&event) {
            tracing::error!(error = %e, "event dispatch failed");
        }
    }
}

fn apply_transition(inner: &mut SessionInner, action: SessionAction) {
    let transition = session_transition(inner.status, action);
    tracing::debug!(
        from = ?transition.from,
        to = ?transition.to,
        reason = transition.reason,
        "session transition"
    );
    inner.status = transition.to;
}

fn serialize_request(request: &RpcRequest) -> Result<String, PortError> {
    serde_json::to_string(request)
        .map_err(|e| PortError::Validation(format!("request serialization failed: {e}")))
}
