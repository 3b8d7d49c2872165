//! WebSocket live-update channel
//!
//! After every successful mutation the API pushes a small change tag
//! (`{"type":"tasks_changed"}` / `{"type":"columns_changed"}`) to every
//! open WebSocket so browser tabs can re-fetch over REST. Board state
//! itself is never pushed over this channel.
//!
//! The registry of open connections is the only shared mutable state in
//! the server. It lives behind [`ConnectionManager`], which exposes
//! exactly `connect`/`disconnect`/`broadcast` and keeps the raw map
//! private. Each connection is represented by the sending half of an
//! unbounded channel; the socket task drains the receiving half. That
//! makes `broadcast` synchronous and non-blocking: a slow or dead peer
//! can never delay the HTTP response that triggered the push.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Change tag broadcast to live viewers after a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// The task collection changed; clients should re-fetch `/tasks`
    TasksChanged,

    /// The column collection changed; clients should re-fetch `/columns`
    ColumnsChanged,
}

/// Identifier handed out by [`ConnectionManager::connect`].
pub type ConnectionId = u64;

/// Registry of live WebSocket connections.
///
/// Cloning is cheap (Arc internally); the router state holds one clone
/// and every socket task holds another.
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

struct Inner {
    next_id: AtomicU64,
    // Guarded map access only; the lock is never held across an await.
    connections: Mutex<HashMap<ConnectionId, UnboundedSender<String>>>,
}

impl ConnectionManager {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                next_id: AtomicU64::new(0),
                connections: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Registers a new connection.
    ///
    /// Returns the connection id plus the receiving half the socket
    /// task must drain and forward to the peer.
    pub fn connect(&self) -> (ConnectionId, UnboundedReceiver<String>) {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();

        self.inner
            .connections
            .lock()
            .expect("connection registry lock poisoned")
            .insert(id, tx);

        tracing::debug!(connection_id = id, "WebSocket connection registered");
        (id, rx)
    }

    /// Removes a connection from the registry.
    ///
    /// Idempotent: removing an id that is already gone is a no-op.
    pub fn disconnect(&self, id: ConnectionId) {
        let removed = self
            .inner
            .connections
            .lock()
            .expect("connection registry lock poisoned")
            .remove(&id)
            .is_some();

        if removed {
            tracing::debug!(connection_id = id, "WebSocket connection removed");
        }
    }

    /// Pushes a change tag to every registered connection.
    ///
    /// The event is serialized once, then delivery is attempted to every
    /// connection; peers whose receiving half is gone are collected
    /// during the sweep and dropped from the registry afterwards. A dead
    /// peer never aborts delivery to the others, and no failure reaches
    /// the caller.
    pub fn broadcast(&self, event: ChangeEvent) {
        let message = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize change event: {}", e);
                return;
            }
        };

        let mut connections = self
            .inner
            .connections
            .lock()
            .expect("connection registry lock poisoned");

        let mut dead = Vec::new();
        for (&id, tx) in connections.iter() {
            if tx.send(message.clone()).is_err() {
                dead.push(id);
            }
        }

        for id in &dead {
            connections.remove(id);
        }

        if !dead.is_empty() {
            tracing::debug!(dropped = dead.len(), "Pruned dead WebSocket connections");
        }
    }

    /// Number of currently registered connections.
    pub fn connection_count(&self) -> usize {
        self.inner
            .connections
            .lock()
            .expect("connection registry lock poisoned")
            .len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_event_wire_format() {
        let json = serde_json::to_string(&ChangeEvent::TasksChanged).unwrap();
        assert_eq!(json, r#"{"type":"tasks_changed"}"#);

        let json = serde_json::to_string(&ChangeEvent::ColumnsChanged).unwrap();
        assert_eq!(json, r#"{"type":"columns_changed"}"#);
    }

    #[test]
    fn test_change_event_roundtrip() {
        let event: ChangeEvent = serde_json::from_str(r#"{"type":"columns_changed"}"#).unwrap();
        assert_eq!(event, ChangeEvent::ColumnsChanged);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_connections() {
        let manager = ConnectionManager::new();
        let (_id1, mut rx1) = manager.connect();
        let (_id2, mut rx2) = manager.connect();

        manager.broadcast(ChangeEvent::TasksChanged);

        assert_eq!(rx1.try_recv().unwrap(), r#"{"type":"tasks_changed"}"#);
        assert_eq!(rx2.try_recv().unwrap(), r#"{"type":"tasks_changed"}"#);
    }

    #[tokio::test]
    async fn test_broadcast_prunes_broken_connection_without_failing() {
        let manager = ConnectionManager::new();
        let (_id1, mut rx1) = manager.connect();
        let (_id2, rx2) = manager.connect();
        let (_id3, mut rx3) = manager.connect();

        // Simulate a broken peer: its receiving half is gone
        drop(rx2);
        assert_eq!(manager.connection_count(), 3);

        manager.broadcast(ChangeEvent::TasksChanged);

        // Healthy peers still got the message, broken one was pruned
        assert!(rx1.try_recv().is_ok());
        assert!(rx3.try_recv().is_ok());
        assert_eq!(manager.connection_count(), 2);

        // A follow-up broadcast keeps working
        manager.broadcast(ChangeEvent::ColumnsChanged);
        assert_eq!(rx1.try_recv().unwrap(), r#"{"type":"columns_changed"}"#);
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let manager = ConnectionManager::new();
        let (id, _rx) = manager.connect();

        manager.disconnect(id);
        manager.disconnect(id);
        manager.disconnect(9999);

        assert_eq!(manager.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_broadcast_with_no_connections_is_a_noop() {
        let manager = ConnectionManager::new();
        manager.broadcast(ChangeEvent::TasksChanged);
        assert_eq!(manager.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_connection_ids_are_unique() {
        let manager = ConnectionManager::new();
        let (id1, _rx1) = manager.connect();
        let (id2, _rx2) = manager.connect();
        assert_ne!(id1, id2);
    }

    #[tokio::test]
    async fn test_concurrent_connect_and_broadcast() {
        let manager = ConnectionManager::new();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let manager = manager.clone();
            handles.push(tokio::spawn(async move {
                let (id, mut rx) = manager.connect();
                manager.broadcast(ChangeEvent::TasksChanged);
                // Each task sees at least its own broadcast
                assert!(rx.recv().await.is_some());
                manager.disconnect(id);
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(manager.connection_count(), 0);
    }
}
