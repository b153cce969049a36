//! Task list errors

use thiserror::Error;

use crate::store::StoreError;

/// Errors returned by task list commands
#[derive(Error, Debug)]
pub enum TaskError {
    /// Title or deadline missing on save
    #[error("Title and deadline are required")]
    Validation,

    /// The task has no store key, so it cannot be addressed
    #[error("Task has not been saved yet")]
    MissingId,

    /// No task matches the given id
    #[error("No task found matching '{0}'")]
    NotFound(String),

    /// More than one task matches the given id fragment
    #[error("Ambiguous id '{0}'. Please provide more characters.")]
    Ambiguous(String),

    /// The store rejected the request
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for task list commands
pub type TaskResult<T> = Result<T, TaskError>;
