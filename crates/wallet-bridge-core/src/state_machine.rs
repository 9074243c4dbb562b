use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Connect,
    ConnectSucceeded,
    ConnectFailed,
    Disconnect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub from: SessionStatus,
    pub to: SessionStatus,
    pub reason: &'static str,
}

/// Every (status, action) pair has a defined outcome: bridge answers can
/// arrive after a disconnect and are still applied.
pub fn session_transition(from: SessionStatus, action: SessionAction) -> StateTransition {
    use SessionAction as A;
    use SessionStatus as S;

    let (to, reason) = match (from, action) {
        (S::Disconnected, A::Connect) => (S::Connecting, "connect_requested"),
        (S::Connecting, A::Connect) => (S::Connecting, "connect_reissued"),
        (S::Connected, A::Connect) => (S::Connected, "reconnect_requested"),
        (_, A::ConnectSucceeded) => (S::Connected, "connect_succeeded"),
        (S::Connected, A::ConnectFailed) => (S::Connected, "reconnect_failed"),
        (_, A::ConnectFailed) => (S::Disconnected, "connect_failed"),
        (_, A::Disconnect) => (S::Disconnected, "disconnected"),
    };
    StateTransition { from, to, reason }
}
