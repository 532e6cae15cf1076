//! In-process registry of live real-time connections.
//!
//! One live handle per user, last-writer-wins on reconnect, removed
//! exactly once on teardown. Pushes to absent or dead handles report
//! `Dropped`; they are never an error and never retried. Scope is a
//! single process: multi-instance deployments need an external broker
//! between instances, not a bigger map.
//!
//! # Usage
//!
//! SSE endpoint (consumer side):
//!   let (guard, rx) = registry.connect(user_id);
//!   // forward rx items; guard tears the entry down when the stream ends
//!
//! Dispatcher (producer side):
//!   registry.push(user_id, json!({"type": "notification", ...}));

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Buffered events per connection before a slow client counts as dead.
const DEFAULT_CAPACITY: usize = 64;

struct Connection {
    id: Uuid,
    tx: mpsc::Sender<serde_json::Value>,
}

/// Outcome of a real-time push attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Delivered,
    Dropped,
}

/// Process-wide connection registry.
///
/// Thread-safe, cloneable. Keyed by user id.
#[derive(Clone)]
pub struct ConnectionRegistry {
    connections: Arc<DashMap<Uuid, Connection>>,
    capacity: usize,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            connections: Arc::new(DashMap::new()),
            capacity,
        }
    }

    /// Register a live connection for a user.
    ///
    /// A previous connection for the same user is replaced; its receiver
    /// closes and its guard becomes a no-op (last-writer-wins).
    pub fn connect(&self, user_id: Uuid) -> (ConnectionGuard, mpsc::Receiver<serde_json::Value>) {
        let (tx, rx) = mpsc::channel(self.capacity);
        let connection_id = Uuid::new_v4();
        self.connections.insert(
            user_id,
            Connection {
                id: connection_id,
                tx,
            },
        );
        let guard = ConnectionGuard {
            connections: self.connections.clone(),
            user_id,
            connection_id,
        };
        (guard, rx)
    }

    /// Push a payload to a user's live connection, if any.
    ///
    /// A failed send means the connection is dead: the handle is removed
    /// immediately and the outcome is `Dropped`. A connection is never
    /// pushed to again after one failed write.
    pub fn push(&self, user_id: Uuid, value: serde_json::Value) -> PushOutcome {
        let Some((connection_id, tx)) = self
            .connections
            .get(&user_id)
            .map(|c| (c.id, c.tx.clone()))
        else {
            return PushOutcome::Dropped;
        };

        match tx.try_send(value) {
            Ok(()) => PushOutcome::Delivered,
            Err(_) => {
                self.connections
                    .remove_if(&user_id, |_, c| c.id == connection_id);
                PushOutcome::Dropped
            }
        }
    }

    /// Explicitly tear down a user's connection.
    pub fn disconnect(&self, user_id: Uuid) {
        self.connections.remove(&user_id);
    }

    /// Whether a user currently has a live handle.
    pub fn is_connected(&self, user_id: Uuid) -> bool {
        self.connections.contains_key(&user_id)
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes the owning connection from the registry when the consuming
/// stream ends. Only removes the entry it created: a replaced connection's
/// guard must not tear down its successor.
pub struct ConnectionGuard {
    connections: Arc<DashMap<Uuid, Connection>>,
    user_id: Uuid,
    connection_id: Uuid,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.connections
            .remove_if(&self.user_id, |_, c| c.id == self.connection_id);
    }
}
