//! Streaming protocol for database listeners
//!
//! A listener is an HTTP response of `text/event-stream`. Each event has a
//! name and a JSON payload:
//!
//! ```text
//! event: put
//! data: {"path": "/", "data": {"-Nq...": {"title": "Buy milk", ...}}}
//!
//! event: patch
//! data: {"path": "/-Nq...", "data": {"completed": true}}
//! ```
//!
//! `put` replaces the node at `path`, `patch` merges children into it. Both
//! paths are relative to the listened location. `keep-alive` carries nothing,
//! `cancel` and `auth_revoked` end the listener.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{tree, Snapshot, StoreError, StoreResult};

/// One raw server-sent event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSentEvent {
    pub event: String,
    pub data: String,
}

/// Incremental `text/event-stream` parser
///
/// Bytes can be fed in arbitrary chunks; events are returned once their
/// terminating blank line has arrived.
#[derive(Debug, Default)]
pub struct EventParser {
    buffer: Vec<u8>,
    /// Bytes of `buffer` already known to contain no newline
    scanned: usize,
    event: String,
    data: Vec<String>,
}

impl EventParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of the response body
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<ServerSentEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(offset) = self.buffer[self.scanned..].iter().position(|&b| b == b'\n') {
            let pos = self.scanned + offset;
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.scanned = 0;
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);

            if let Some(event) = self.process_line(line) {
                events.push(event);
            }
        }
        self.scanned = self.buffer.len();
        events
    }

    fn process_line(&mut self, line: &str) -> Option<ServerSentEvent> {
        if line.is_empty() {
            if self.event.is_empty() && self.data.is_empty() {
                return None;
            }
            return Some(ServerSentEvent {
                event: std::mem::take(&mut self.event),
                data: std::mem::take(&mut self.data).join("\n"),
            });
        }

        // Comment line
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = value.to_string(),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
        None
    }
}

#[derive(Debug, Deserialize)]
struct PathData {
    path: String,
    data: Value,
}

/// A decoded listener event
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseEvent {
    Put { path: String, data: Value },
    Patch { path: String, data: Map<String, Value> },
    KeepAlive,
    Cancel(String),
    AuthRevoked,
}

impl DatabaseEvent {
    /// Decode a server-sent event; unknown event names yield `None`
    pub fn parse(event: &ServerSentEvent) -> StoreResult<Option<Self>> {
        let parsed = match event.event.as_str() {
            "put" => {
                let PathData { path, data } = serde_json::from_str(&event.data)?;
                DatabaseEvent::Put { path, data }
            }
            "patch" => {
                let PathData { path, data } = serde_json::from_str(&event.data)?;
                let Value::Object(data) = data else {
                    return Err(StoreError::Stream(format!(
                        "patch payload for '{}' is not an object",
                        path
                    )));
                };
                DatabaseEvent::Patch { path, data }
            }
            "keep-alive" => DatabaseEvent::KeepAlive,
            "cancel" => DatabaseEvent::Cancel(cancel_reason(&event.data)),
            "auth_revoked" => DatabaseEvent::AuthRevoked,
            _ => return Ok(None),
        };
        Ok(Some(parsed))
    }
}

/// Cancel payloads are a JSON string or null
fn cancel_reason(data: &str) -> String {
    match serde_json::from_str::<Value>(data) {
        Ok(Value::String(reason)) => reason,
        Ok(Value::Null) => "permission denied".to_string(),
        _ if data.trim().is_empty() => "permission denied".to_string(),
        _ => data.trim().to_string(),
    }
}

/// Local copy of the listened location, rebuilt from stream events
#[derive(Debug, Default)]
pub struct Mirror {
    root: Value,
}

impl Mirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a data event; returns true if the mirrored value may have changed
    pub fn apply(&mut self, event: DatabaseEvent) -> bool {
        match event {
            DatabaseEvent::Put { path, data } => {
                tree::set(&mut self.root, &path, data);
                true
            }
            DatabaseEvent::Patch { path, data } => {
                tree::merge(&mut self.root, &path, data);
                true
            }
            _ => false,
        }
    }

    /// Children of the listened location
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_value(&self.root)
    }
}
