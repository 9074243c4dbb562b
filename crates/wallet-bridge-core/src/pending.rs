//! Request id allocation and the table of requests awaiting a bridge answer.

use std::collections::HashMap;

use crate::domain::{RequestId, RpcResponse};
use crate::ports::PortError;

pub type SuccessCallback = Box<dyn FnOnce(RpcResponse) + Send + 'static>;
pub type ErrorCallback = Box<dyn FnOnce(String) + Send + 'static>;

pub struct PendingEntry {
    pub on_success: SuccessCallback,
    pub on_error: ErrorCallback,
}

impl std::fmt::Debug for PendingEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingEntry").finish_non_exhaustive()
    }
}

/// Monotonic id source. Id 0 is never handed out.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: RequestId,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn next(&mut self) -> RequestId {
        let id = self.next;
        self.next = self.next.checked_add(1).unwrap_or(1);
        id
    }

    /// Next id that is not pending in `table`.
    pub fn next_free(&mut self, table: &PendingRequestTable) -> RequestId {
        loop {
            let id = self.next();
            if !table.contains(id) {
                return id;
            }
            tracing::warn!(id, "skipping request id still pending after counter wrap");
        }
    }
}

#[derive(Debug, Default)]
pub struct PendingRequestTable {
    entries: HashMap<RequestId, PendingEntry>,
}

impl PendingRequestTable {
    pub fn register(
        &mut self,
        id: RequestId,
        on_success: SuccessCallback,
        on_error: ErrorCallback,
    ) -> Result<(), PortError> {
        if self.entries.contains_key(&id) {
            return Err(PortError::Conflict(format!("request id already pending: {id}")));
        }
        self.entries.insert(
            id,
            PendingEntry {
                on_success,
                on_error,
            },
        );
        Ok(())
    }

    /// Removes the entry; the caller owns invoking it.
    pub fn take(&mut self, id: RequestId) -> Option<PendingEntry> {
        self.entries.remove(&id)
    }

    /// Invokes `on_success` once. Returns false when `id` is not pending.
    pub fn resolve_success(&mut self, id: RequestId, response: RpcResponse) -> bool {
        match self.take(id) {
            Some(entry) => {
                (entry.on_success)(response);
                true
            }
            None => false,
        }
    }

    /// Invokes `on_error` once. Returns false when `id` is not pending.
    pub fn resolve_error(&mut self, id: RequestId, message: String) -> bool {
        match self.take(id) {
            Some(entry) => {
                (entry.on_error)(message);
                true
            }
            None => false,
        }
    }

    pub fn drain(&mut self) -> Vec<(RequestId, PendingEntry)> {
        let mut drained: Vec<_> = self.entries.drain().collect();
        drained.sort_by_key(|(id, _)| *id);
        drained
    }

    pub fn contains(&self, id: RequestId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
