use dashmap::DashMap;
use jobdeck_core::types::ConnId;
use tokio::sync::mpsc;

/// Outbound handle of one live-view observer. Dropping the last sender
/// ends the observer's write loop and closes its socket.
pub type ObserverTx = mpsc::Sender<String>;

/// What a [`ConnectionRegistry::for_each`] callback wants done with the
/// entry it was just handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Keep,
    Remove,
}

/// Set of currently connected observers.
pub struct ConnectionRegistry {
    observers: DashMap<ConnId, ObserverTx>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            observers: DashMap::new(),
        }
    }

    pub fn add(&self, conn_id: ConnId, tx: ObserverTx) {
        self.observers.insert(conn_id, tx);
    }

    /// Returns `true` only for the call that actually removed the entry.
    pub fn remove(&self, conn_id: &ConnId) -> bool {
        self.observers.remove(conn_id).is_some()
    }

    pub fn count(&self) -> usize {
        self.observers.len()
    }

    /// Visit every observer. Handles are copied out first so the callback
    /// runs without holding any shard lock; requested removals are applied
    /// afterwards. Returns the ids that were removed by this call.
    pub fn for_each<F>(&self, mut f: F) -> Vec<ConnId>
    where
        F: FnMut(&ConnId, &ObserverTx) -> Visit,
    {
        let handles: Vec<(ConnId, ObserverTx)> = self
            .observers
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let doomed: Vec<ConnId> = handles
            .iter()
            .filter(|(id, tx)| f(id, tx) == Visit::Remove)
            .map(|(id, _)| id.clone())
            .collect();

        doomed.into_iter().filter(|id| self.remove(id)).collect()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
