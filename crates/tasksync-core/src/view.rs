//! Display layer contract
//!
//! Whatever shows the list implements `TaskView`. The task list calls it after
//! every snapshot and for every user-visible message.

use crate::models::Task;

/// Receives the ordered list and user-facing notifications
pub trait TaskView {
    /// The list was replaced; `tasks` is already ordered
    fn render_list(&mut self, tasks: &[Task]);

    /// Called right after `render_list` with whether the list is empty
    fn render_empty_state(&mut self, is_empty: bool);

    /// Show a short transient message
    fn notify(&mut self, message: &str);
}

/// What a `RecordingView` has been asked to show
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    List(Vec<Task>),
    EmptyState(bool),
    Notice(String),
}

/// View that keeps every call, for tests and headless use
#[derive(Debug, Default)]
pub struct RecordingView {
    pub events: Vec<ViewEvent>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages passed to `notify`, oldest first
    pub fn notices(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ViewEvent::Notice(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Most recently rendered list
    pub fn last_list(&self) -> Option<&[Task]> {
        self.events.iter().rev().find_map(|e| match e {
            ViewEvent::List(tasks) => Some(tasks.as_slice()),
            _ => None,
        })
    }

    /// Most recent empty-state flag
    pub fn last_empty_state(&self) -> Option<bool> {
        self.events.iter().rev().find_map(|e| match e {
            ViewEvent::EmptyState(empty) => Some(*empty),
            _ => None,
        })
    }
}

impl TaskView for RecordingView {
    fn render_list(&mut self, tasks: &[Task]) {
        self.events.push(ViewEvent::List(tasks.to_vec()));
    }

    fn render_empty_state(&mut self, is_empty: bool) {
        self.events.push(ViewEvent::EmptyState(is_empty));
    }

    fn notify(&mut self, message: &str) {
        self.events.push(ViewEvent::Notice(message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_view() {
        let mut view = RecordingView::new();
        assert!(view.last_list().is_none());

        view.render_list(&[Task::new(Some("a".into()), "A", "", "01/01/2030")]);
        view.render_empty_state(false);
        view.notify("hello");

        assert_eq!(view.last_list().map(|l| l.len()), Some(1));
        assert_eq!(view.last_empty_state(), Some(false));
        assert_eq!(view.notices(), vec!["hello"]);
    }
}
