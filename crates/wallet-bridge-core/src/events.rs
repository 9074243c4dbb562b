use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::domain::{BalanceResult, WalletConnectionResult};
use crate::ports::PortError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    ProviderUnavailable,
    Transport,
    Application,
    PayloadParse,
    MissingResult,
    MissingAddress,
    UnmatchedResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    WalletConnected(WalletConnectionResult),
    WalletDisconnected(String),
    BalanceReceived(BalanceResult),
    Error { kind: ErrorKind, message: String },
}

impl SessionEvent {
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        SessionEvent::Error {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&SessionEvent) + Send + Sync + 'static>;

#[derive(Clone)]
enum Subscriber {
    Handler(Handler),
    /// Pruned on the first emit after its receiver is dropped.
    Channel(mpsc::Sender<SessionEvent>),
}

#[derive(Default)]
pub struct EventBus {
    inner: Mutex<Subscribers>,
}

#[derive(Default)]
struct Subscribers {
    seq: u64,
    handlers: Vec<(SubscriptionId, Subscriber)>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.len())
            .finish()
    }
}

impl EventBus {
    pub fn subscribe<F>(&self, handler: F) -> Result<SubscriptionId, PortError>
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.add(Subscriber::Handler(Arc::new(handler)))
    }

    /// Subscribes a channel; events are cloned into it until the receiver
    /// is dropped or the subscription is removed.
    pub fn subscribe_channel(
        &self,
    ) -> Result<(SubscriptionId, mpsc::Receiver<SessionEvent>), PortError> {
        let (tx, rx) = mpsc::channel();
        let id = self.add(Subscriber::Channel(tx))?;
        Ok((id, rx))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<bool, PortError> {
        let mut g = self.lock()?;
        let before = g.handlers.len();
        g.handlers.retain(|(sid, _)| *sid != id);
        Ok(g.handlers.len() != before)
    }

    pub fn clear(&self) -> Result<(), PortError> {
        self.lock()?.handlers.clear();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|g| g.handlers.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handlers run outside the lock so they may subscribe or unsubscribe.
    pub fn emit(&self, event: &SessionEvent) -> Result<(), PortError> {
        let snapshot: Vec<(SubscriptionId, Subscriber)> = self.lock()?.handlers.clone();
        let mut closed = Vec::new();
        for (id, subscriber) in snapshot {
            match subscriber {
                Subscriber::Handler(handler) => handler(event),
                Subscriber::Channel(tx) => {
                    if tx.send(event.clone()).is_err() {
                        closed.push(id);
                    }
                }
            }
        }
        if !closed.is_empty() {
            tracing::debug!(count = closed.len(), "removing subscribers with dropped receivers");
            self.lock()?.handlers.retain(|(id, _)| !closed.contains(id));
        }
        Ok(())
    }

    fn add(&self, subscriber: Subscriber) -> Result<SubscriptionId, PortError> {
        let mut g = self.lock()?;
        g.seq = g.seq.saturating_add(1);
        let id = SubscriptionId(g.seq);
        g.handlers.push((id, subscriber));
        Ok(id)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Subscribers>, PortError> {
        self.inner
            .lock()
            .map_err(|e| PortError::Transport(format!("event bus lock poisoned: {e}")))
    }
}
