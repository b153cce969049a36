//! Task list synchronizer
//!
//! `TaskList` holds the ordered tasks shown to the user. The list is never
//! edited in place: every snapshot from the store replaces it wholesale, and
//! user commands only write to the store, whose next snapshot brings the
//! change back.
//!
//! ## Usage
//!
//! ```ignore
//! let mut list = TaskList::new(store, view);
//! let mut subscription = list.subscribe();
//!
//! list.create_or_update(None, "Buy milk", "", "01/01/2030").await?;
//! list.run(&mut subscription).await;
//! ```

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{TaskError, TaskResult};
use crate::models::Task;
use crate::order;
use crate::store::{RemoteStore, Snapshot, StoreError, StoreEvent, Subscription};
use crate::view::TaskView;

/// Store location holding the task records
pub const DEFAULT_PATH: &str = "tasks";

/// Notification texts
pub mod notices {
    pub const VALIDATION: &str = "Title and deadline are required";
    pub const ADDED: &str = "Task added";
    pub const UPDATED: &str = "Task updated";
    pub const DELETED: &str = "Task deleted";
}

/// Ordered view of all tasks, kept in step with the store
pub struct TaskList<S, V> {
    store: S,
    view: V,
    path: String,
    tasks: Vec<Task>,
}

impl<S: RemoteStore, V: TaskView> TaskList<S, V> {
    /// Create a list over the default `tasks` location
    pub fn new(store: S, view: V) -> Self {
        Self::with_path(store, view, DEFAULT_PATH)
    }

    /// Create a list over a specific store location
    pub fn with_path(store: S, view: V, path: impl Into<String>) -> Self {
        Self {
            store,
            view,
            path: path.into(),
            tasks: Vec::new(),
        }
    }

    /// Start listening to the task location
    pub fn subscribe(&self) -> Subscription {
        self.store.subscribe(&self.path)
    }

    /// Current ordered tasks
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    // ==================== Snapshots ====================

    /// Rebuild the list from a full snapshot
    ///
    /// Records that fail to decode are skipped.
    pub fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.tasks.clear();

        for (key, record) in snapshot.children() {
            match Task::from_record(key, record) {
                Ok(task) => self.tasks.push(task),
                Err(e) => debug!("Skipping record: {}", e),
            }
        }

        order::sort_tasks(&mut self.tasks);
        debug!(
            "Task list rebuilt: {} of {} records",
            self.tasks.len(),
            snapshot.len()
        );

        self.view.render_list(&self.tasks);
        self.view.render_empty_state(self.tasks.is_empty());
    }

    /// Report a listener failure; the current list stays as it is
    pub fn on_snapshot_error(&mut self, error: &StoreError) {
        warn!("Task listener error: {}", error);
        self.view.notify(&error.to_string());
    }

    /// Apply one event from the subscription
    pub fn handle_event(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::Snapshot(snapshot) => self.on_snapshot(&snapshot),
            StoreEvent::Error(error) => self.on_snapshot_error(&error),
        }
    }

    /// Apply events that have already arrived; returns how many were applied
    pub fn drain(&mut self, subscription: &mut Subscription) -> usize {
        let mut applied = 0;
        while let Some(event) = subscription.try_next() {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    /// Wait until one snapshot has been applied
    ///
    /// A listener error, or the listener closing first, is reported to the
    /// view and returned.
    pub async fn sync_once(&mut self, subscription: &mut Subscription) -> TaskResult<()> {
        match subscription.next().await {
            Some(StoreEvent::Snapshot(snapshot)) => {
                self.on_snapshot(&snapshot);
                Ok(())
            }
            Some(StoreEvent::Error(error)) => {
                self.on_snapshot_error(&error);
                Err(error.into())
            }
            None => {
                let error = StoreError::Stream("listener closed before first snapshot".into());
                self.on_snapshot_error(&error);
                Err(error.into())
            }
        }
    }

    /// Apply events until the subscription ends
    ///
    /// Returns the last listener error seen, which is usually why the
    /// subscription ended.
    pub async fn run(&mut self, subscription: &mut Subscription) -> Option<StoreError> {
        let mut last_error = None;
        while let Some(event) = subscription.next().await {
            match event {
                StoreEvent::Snapshot(snapshot) => self.on_snapshot(&snapshot),
                StoreEvent::Error(error) => {
                    self.on_snapshot_error(&error);
                    last_error = Some(error);
                }
            }
        }
        debug!("Task listener ended");
        last_error
    }

    // ==================== Commands ====================

    /// Save a new task (`existing` is `None`) or edit an existing one
    ///
    /// Inputs are trimmed. An empty title or deadline is reported and nothing
    /// is written. Editing keeps the task's id and completion state and
    /// replaces the whole stored record.
    pub async fn create_or_update(
        &mut self,
        existing: Option<&Task>,
        title: &str,
        description: &str,
        deadline: &str,
    ) -> TaskResult<Task> {
        let (title, description, deadline) = (title.trim(), description.trim(), deadline.trim());

        if title.is_empty() || deadline.is_empty() {
            self.view.notify(notices::VALIDATION);
            return Err(TaskError::Validation);
        }

        let (task, notice) = match existing {
            None => {
                let key = self.store.generate_key(&self.path);
                (
                    Task::new(Some(key), title, description, deadline),
                    notices::ADDED,
                )
            }
            Some(existing) => (
                existing.with_details(title, description, deadline),
                notices::UPDATED,
            ),
        };

        let key = task.id.as_deref().ok_or(TaskError::MissingId)?;
        match self.store.write(&self.path, key, task.to_record()).await {
            Ok(()) => {
                self.view.notify(notice);
                Ok(task)
            }
            Err(e) => {
                self.view.notify(&format!("Failed to save task: {}", e));
                Err(e.into())
            }
        }
    }

    /// Delete a task; returns false when the task was never saved
    pub async fn delete(&mut self, task: &Task) -> TaskResult<bool> {
        let Some(ref key) = task.id else {
            return Ok(false);
        };

        match self.store.remove(&self.path, key).await {
            Ok(()) => {
                self.view.notify(notices::DELETED);
                Ok(true)
            }
            Err(e) => {
                self.view.notify(&format!("Failed to delete task: {}", e));
                Err(e.into())
            }
        }
    }

    /// Check or uncheck a task
    ///
    /// Writes only the `completed` field. Failures are logged and otherwise
    /// ignored.
    pub async fn set_completed(&mut self, task: &Task, value: bool) {
        let Some(ref key) = task.id else {
            return;
        };

        if let Err(e) = self
            .store
            .write_field(&self.path, key, "completed", Value::Bool(value))
            .await
        {
            warn!("Failed to set completed={} on {}: {}", value, key, e);
        }
    }

    // ==================== Lookup ====================

    /// Find a task by full id, or by a unique leading or trailing fragment
    pub fn find(&self, id: &str) -> TaskResult<&Task> {
        if let Some(task) = self.tasks.iter().find(|t| t.id.as_deref() == Some(id)) {
            return Ok(task);
        }

        let mut matches = self.tasks.iter().filter(|t| {
            t.id
                .as_deref()
                .is_some_and(|key| !id.is_empty() && (key.starts_with(id) || key.ends_with(id)))
        });

        match (matches.next(), matches.next()) {
            (Some(task), None) => Ok(task),
            (None, _) => Err(TaskError::NotFound(id.to_string())),
            (Some(_), Some(_)) => Err(TaskError::Ambiguous(id.to_string())),
        }
    }
}
