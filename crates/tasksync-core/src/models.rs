//! Data models for tasksync
//!
//! Defines the single entity, `Task`, and its mapping to and from the JSON
//! record stored under each key of the realtime database.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A stored record could not be turned into a `Task`
#[derive(Error, Debug)]
#[error("Failed to decode task record '{key}': {source}")]
pub struct DecodeError {
    pub key: String,
    #[source]
    pub source: serde_json::Error,
}

/// A to-do item
///
/// Absent fields decode to their defaults, so a partially written record still
/// produces a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Task {
    /// Store key; unset only before the task has been persisted
    pub id: Option<String>,
    /// Display title
    pub title: String,
    /// Free-form description, may be empty
    pub description: String,
    /// Deadline as `dd/mm/yyyy` text
    pub deadline: String,
    /// Whether the task has been checked off
    pub completed: bool,
}

impl Task {
    /// Create a new, not yet completed task
    pub fn new(
        id: Option<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        deadline: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            deadline: deadline.into(),
            completed: false,
        }
    }

    /// Copy of this task with new editable fields
    ///
    /// `id` and `completed` are carried over unchanged.
    pub fn with_details(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        deadline: impl Into<String>,
    ) -> Self {
        Self {
            id: self.id.clone(),
            title: title.into(),
            description: description.into(),
            deadline: deadline.into(),
            completed: self.completed,
        }
    }

    /// Decode a stored record, taking the id from its store key
    pub fn from_record(key: &str, record: &Value) -> Result<Self, DecodeError> {
        let mut task = Task::deserialize(record).map_err(|source| DecodeError {
            key: key.to_string(),
            source,
        })?;
        task.id = Some(key.to_string());
        Ok(task)
    }

    /// Encode as the record written to the store
    pub fn to_record(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "title": self.title,
            "description": self.description,
            "deadline": self.deadline,
            "completed": self.completed,
        })
    }

    /// Abbreviated id for display
    pub fn short_id(&self) -> &str {
        let Some(id) = self.id.as_deref() else {
            return "-";
        };
        match id.char_indices().rev().nth(7) {
            Some((start, _)) => &id[start..],
            None => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_new() {
        let task = Task::new(None, "Buy milk", "", "01/01/2030");
        assert!(task.id.is_none());
        assert_eq!(task.title, "Buy milk");
        assert!(task.description.is_empty());
        assert_eq!(task.deadline, "01/01/2030");
        assert!(!task.completed);
    }

    #[test]
    fn test_with_details_preserves_id_and_completed() {
        let mut task = Task::new(Some("abc".into()), "Old", "desc", "01/01/2030");
        task.completed = true;

        let edited = task.with_details("New", "", "02/02/2030");
        assert_eq!(edited.id.as_deref(), Some("abc"));
        assert!(edited.completed);
        assert_eq!(edited.title, "New");
        assert_eq!(edited.description, "");
        assert_eq!(edited.deadline, "02/02/2030");
    }

    #[test]
    fn test_from_record_assigns_key() {
        let record = json!({
            "id": "stale",
            "title": "Write report",
            "description": "Q3",
            "deadline": "15/10/2030",
            "completed": true
        });

        let task = Task::from_record("key-1", &record).unwrap();
        assert_eq!(task.id.as_deref(), Some("key-1"));
        assert_eq!(task.title, "Write report");
        assert!(task.completed);
    }

    #[test]
    fn test_from_record_fills_missing_fields() {
        let task = Task::from_record("k", &json!({"title": "Only title"})).unwrap();
        assert_eq!(task.title, "Only title");
        assert_eq!(task.deadline, "");
        assert!(!task.completed);
    }

    #[test]
    fn test_from_record_ignores_unknown_fields() {
        let record = json!({"title": "T", "deadline": "01/01/2030", "priority": 3});
        assert!(Task::from_record("k", &record).is_ok());
    }

    #[test]
    fn test_from_record_rejects_malformed() {
        assert!(Task::from_record("k", &json!("just a string")).is_err());
        assert!(Task::from_record("k", &json!({"completed": "yes"})).is_err());

        let err = Task::from_record("bad-key", &json!(42)).unwrap_err();
        assert!(err.to_string().contains("bad-key"));
    }

    #[test]
    fn test_to_record_fields() {
        let task = Task::new(Some("abc".into()), "T", "D", "01/01/2030");
        let record = task.to_record();
        assert_eq!(record["id"], "abc");
        assert_eq!(record["title"], "T");
        assert_eq!(record["description"], "D");
        assert_eq!(record["deadline"], "01/01/2030");
        assert_eq!(record["completed"], false);
    }

    #[test]
    fn test_short_id() {
        let task = Task::new(Some("-NqXa1b2c3d4e5f6g7h8".into()), "T", "", "d");
        assert_eq!(task.short_id(), "e5f6g7h8");
        assert_eq!(Task::new(Some("abc".into()), "T", "", "d").short_id(), "abc");
        assert_eq!(Task::default().short_id(), "-");
    }
}
