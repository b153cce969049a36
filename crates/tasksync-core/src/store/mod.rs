//! Realtime store client
//!
//! The task list never reads records directly. It subscribes to a path and
//! receives the full set of children every time anything under that path
//! changes, and it mutates the store with keyed writes.
//!
//! ## Implementations
//!
//! - `MemoryStore`: in-process store, used for tests and embedding
//! - `FirebaseStore`: Firebase Realtime Database over its REST API, with
//!   changes streamed as server-sent events

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

pub mod error;
pub mod event_stream;
pub mod firebase;
pub mod memory;
pub mod push_id;
pub mod tree;

pub use error::{StoreError, StoreResult};
pub use firebase::FirebaseStore;
pub use memory::MemoryStore;
pub use push_id::PushIdGenerator;

/// Full point-in-time view of the children under a path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    children: Vec<(String, Value)>,
}

impl Snapshot {
    /// Build a snapshot from `(key, record)` pairs in store order
    pub fn new(children: Vec<(String, Value)>) -> Self {
        Self { children }
    }

    /// Build a snapshot from the value stored at a path
    ///
    /// An object yields one child per entry. Anything else (including null,
    /// an absent path) is an empty snapshot.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self {
                children: map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            },
            _ => Self::default(),
        }
    }

    /// Iterate over `(key, record)` pairs
    pub fn children(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Something a subscription delivers
#[derive(Debug)]
pub enum StoreEvent {
    /// The children under the subscribed path changed
    Snapshot(Snapshot),
    /// The listener failed or was cancelled by the store
    Error(StoreError),
}

/// A persistent listener on a store path
///
/// Dropping the subscription unregisters the listener.
#[derive(Debug)]
pub struct Subscription {
    events: mpsc::UnboundedReceiver<StoreEvent>,
}

impl Subscription {
    /// Create a subscription and the sender the store pushes events into
    pub fn channel() -> (mpsc::UnboundedSender<StoreEvent>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { events: rx })
    }

    /// Wait for the next event; `None` once the store has stopped pushing
    pub async fn next(&mut self) -> Option<StoreEvent> {
        self.events.recv().await
    }

    /// Take an already delivered event without waiting
    pub fn try_next(&mut self) -> Option<StoreEvent> {
        self.events.try_recv().ok()
    }
}

/// Key-value realtime store keyed by generated identifiers
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Register a listener that receives the current children of `path`,
    /// then a fresh snapshot after every change
    fn subscribe(&self, path: &str) -> Subscription;

    /// Produce a store-unique key without writing anything
    fn generate_key(&self, path: &str) -> String;

    /// Replace the whole record at `path/key`
    async fn write(&self, path: &str, key: &str, record: Value) -> StoreResult<()>;

    /// Update a single field of the record at `path/key`
    async fn write_field(&self, path: &str, key: &str, field: &str, value: Value)
        -> StoreResult<()>;

    /// Delete the record at `path/key`
    async fn remove(&self, path: &str, key: &str) -> StoreResult<()>;
}

/// Split a slash-separated store path into its non-empty segments
pub(crate) fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}
