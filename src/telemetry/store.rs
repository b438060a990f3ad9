use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;
use std::fmt;
use tokio::sync::broadcast;

/// Update pushed to firehose subscribers on every write
#[derive(Clone, Debug)]
pub struct StoreUpdate {
    pub path: String,
    pub value: Value,
    pub timestamp: DateTime<Utc>,
}

/// Store-level write failure (network, permission, quota)
#[derive(Debug, Clone, PartialEq)]
pub struct StoreError(pub String);

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store write failed: {}", self.0)
    }
}

impl std::error::Error for StoreError {}

/// Key-addressed value store with push-style change delivery.
///
/// Subscribers receive every subsequent write via the firehose channel;
/// values current at subscribe time are readable through `get`. Writes are
/// asynchronous and may fail independently; there is no retry here.
#[async_trait]
pub trait TelemetryStore: Send + Sync + 'static {
    /// Latest value at a path, if any
    fn get(&self, path: &str) -> Option<Value>;

    /// Subscribe to all subsequent writes
    fn subscribe(&self) -> broadcast::Receiver<StoreUpdate>;

    /// Persist a value at a path
    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError>;
}

/// In-memory reference store for local runs and tests.
///
/// Broadcasts on every write, including writes that repeat the current
/// value. Delivery is level-triggered, matching the remote store.
pub struct MemoryStore {
    values: DashMap<String, Value>,
    update_tx: broadcast::Sender<StoreUpdate>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (update_tx, _) = broadcast::channel(256);

        Self {
            values: DashMap::new(),
            update_tx,
        }
    }
}

#[async_trait]
impl TelemetryStore for MemoryStore {
    fn get(&self, path: &str) -> Option<Value> {
        self.values.get(path).map(|v| v.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreUpdate> {
        self.update_tx.subscribe()
    }

    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError> {
        self.values.insert(path.to_string(), value.clone());

        // Send fails only when nobody is subscribed
        let _ = self.update_tx.send(StoreUpdate {
            path: path.to_string(),
            value,
            timestamp: Utc::now(),
        });

        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
