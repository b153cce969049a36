//! In-process realtime store
//!
//! Behaves like the remote database: one JSON tree, listeners that get the
//! full children of their path after every change, and generated push keys.
//! Every operation is recorded so callers can check exactly which requests
//! were issued.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use super::push_id::PushIdGenerator;
use super::{segments, tree, RemoteStore, Snapshot, StoreError, StoreEvent, StoreResult, Subscription};

/// A request issued against the store
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    GenerateKey {
        path: String,
    },
    Write {
        path: String,
        key: String,
        record: Value,
    },
    WriteField {
        path: String,
        key: String,
        field: String,
        value: Value,
    },
    Remove {
        path: String,
        key: String,
    },
}

struct Listener {
    path: String,
    tx: mpsc::UnboundedSender<StoreEvent>,
}

#[derive(Default)]
struct Inner {
    root: Value,
    listeners: Vec<Listener>,
    calls: Vec<StoreCall>,
    failure: Option<String>,
}

/// Shared handle to an in-memory store
///
/// Clones refer to the same tree.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    keys: Arc<PushIdGenerator>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later write, field write and remove fail with `message`
    ///
    /// Pass `None` to let writes succeed again.
    pub fn fail_writes(&self, message: Option<&str>) {
        self.lock().failure = message.map(str::to_string);
    }

    /// Cancel every listener on `path` with `message`
    ///
    /// Each listener receives the error and then ends, as a listener the
    /// database cancels does.
    pub fn push_error(&self, path: &str, message: &str) {
        self.lock().listeners.retain(|listener| {
            if listener.path != path {
                return true;
            }
            let _ = listener
                .tx
                .send(StoreEvent::Error(StoreError::Cancelled(message.to_string())));
            false
        });
    }

    /// Requests issued so far, oldest first
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Forget recorded requests
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Value currently stored at `path`
    pub fn get(&self, path: &str) -> Option<Value> {
        tree::get(&self.lock().root, path).cloned()
    }

    /// Number of live listeners
    pub fn listener_count(&self) -> usize {
        let mut inner = self.lock();
        inner.listeners.retain(|l| !l.tx.is_closed());
        inner.listeners.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record the call, apply it unless failures are injected, then notify
    fn mutate(&self, call: StoreCall, target: String, value: Option<Value>) -> StoreResult<()> {
        let mut inner = self.lock();
        inner.calls.push(call);

        if let Some(ref message) = inner.failure {
            return Err(StoreError::Unavailable(message.clone()));
        }

        tree::set(&mut inner.root, &target, value.unwrap_or(Value::Null));
        inner.notify(&target);
        Ok(())
    }
}

impl Inner {
    /// Send a fresh snapshot to every listener whose path overlaps `changed`
    fn notify(&mut self, changed: &str) {
        let changed: Vec<&str> = segments(changed).collect();
        let root = &self.root;

        self.listeners.retain(|listener| {
            let watched: Vec<&str> = segments(&listener.path).collect();
            let overlaps = watched.iter().zip(changed.iter()).all(|(a, b)| a == b);
            if !overlaps {
                return !listener.tx.is_closed();
            }
            let snapshot = snapshot_at(root, &listener.path);
            listener.tx.send(StoreEvent::Snapshot(snapshot)).is_ok()
        });
    }
}

fn snapshot_at(root: &Value, path: &str) -> Snapshot {
    tree::get(root, path)
        .map(Snapshot::from_value)
        .unwrap_or_default()
}

fn child_path(path: &str, key: &str) -> String {
    format!("{}/{}", path.trim_end_matches('/'), key)
}

#[async_trait]
impl RemoteStore for MemoryStore {
    fn subscribe(&self, path: &str) -> Subscription {
        let (tx, subscription) = Subscription::channel();
        let mut inner = self.lock();

        let initial = snapshot_at(&inner.root, path);
        debug!("Subscribed to '{}' ({} children)", path, initial.len());
        if tx.send(StoreEvent::Snapshot(initial)).is_ok() {
            inner.listeners.push(Listener {
                path: path.to_string(),
                tx,
            });
        }

        subscription
    }

    fn generate_key(&self, path: &str) -> String {
        self.lock().calls.push(StoreCall::GenerateKey {
            path: path.to_string(),
        });
        self.keys.generate()
    }

    async fn write(&self, path: &str, key: &str, record: Value) -> StoreResult<()> {
        let call = StoreCall::Write {
            path: path.to_string(),
            key: key.to_string(),
            record: record.clone(),
        };
        self.mutate(call, child_path(path, key), Some(record))
    }

    async fn write_field(
        &self,
        path: &str,
        key: &str,
        field: &str,
        value: Value,
    ) -> StoreResult<()> {
        let call = StoreCall::WriteField {
            path: path.to_string(),
            key: key.to_string(),
            field: field.to_string(),
            value: value.clone(),
        };
        let target = child_path(&child_path(path, key), field);
        self.mutate(call, target, Some(value))
    }

    async fn remove(&self, path: &str, key: &str) -> StoreResult<()> {
        let call = StoreCall::Remove {
            path: path.to_string(),
            key: key.to_string(),
        };
        self.mutate(call, child_path(path, key), None)
    }
}
