//! Command handlers

pub mod config;
pub mod task;
pub mod watch;

use anyhow::{bail, Context, Result};
use thiserror::Error;

use tasksync_core::{Config, FirebaseStore, Subscription, TaskError, TaskList};

use crate::output::Output;

/// The task list as the CLI drives it
pub type CliList = TaskList<FirebaseStore, Output>;

/// A failure the task list has already shown to the user
#[derive(Error, Debug)]
#[error("{0}")]
pub struct Reported(#[source] pub TaskError);

impl Reported {
    /// What the user can do about a store failure
    pub fn hint(&self) -> Option<&'static str> {
        let TaskError::Store(ref err) = self.0 else {
            return None;
        };
        err.recovery_suggestion().or_else(|| {
            err.is_recoverable()
                .then_some("The database may be temporarily unreachable. Try again shortly.")
        })
    }
}

/// Convert a task list error, marking the ones already shown
pub fn reported(err: TaskError) -> anyhow::Error {
    match err {
        TaskError::Validation | TaskError::Store(_) => Reported(err).into(),
        other => other.into(),
    }
}

/// Open the configured database
pub fn open_store(config: &Config) -> Result<FirebaseStore> {
    let Some(url) = config.database_url.as_deref() else {
        bail!(
            "Database not configured. Set one with:\n  \
             tasksync config set database_url https://<project>.firebaseio.com"
        );
    };

    FirebaseStore::new(url, config.auth_token.clone()).context("Failed to open database")
}

/// Open the database, subscribe to the task path and apply the first snapshot
pub async fn load_list(config: &Config, output: Output) -> Result<(CliList, Subscription)> {
    let store = open_store(config)?;
    let mut list = TaskList::with_path(store, output, config.tasks_path.clone());
    let mut subscription = list.subscribe();

    list.sync_once(&mut subscription).await.map_err(reported)?;

    Ok((list, subscription))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasksync_core::StoreError;

    #[test]
    fn test_open_store_requires_database_url() {
        let config = Config::default();
        let err = open_store(&config).unwrap_err();
        assert!(err.to_string().contains("tasksync config set database_url"));
    }

    #[test]
    fn test_open_store_rejects_bad_url() {
        let config = Config {
            database_url: Some("demo.firebaseio.com".into()),
            ..Config::default()
        };
        assert!(open_store(&config).is_err());
    }

    #[test]
    fn test_open_store() {
        let config = Config {
            database_url: Some("https://demo.firebaseio.com".into()),
            ..Config::default()
        };
        let store = open_store(&config).unwrap();
        assert_eq!(store.base_url(), "https://demo.firebaseio.com");
    }

    #[test]
    fn test_reported_hint() {
        assert!(Reported(TaskError::Validation).hint().is_none());
        let revoked = Reported(TaskError::Store(StoreError::AuthRevoked));
        assert!(revoked.hint().unwrap().contains("auth_token"));
        let offline = Reported(TaskError::Store(StoreError::Unavailable("offline".into())));
        assert!(offline.hint().unwrap().contains("Try again"));
    }

    #[test]
    fn test_reported_marks_shown_errors() {
        assert!(reported(TaskError::Validation).is::<Reported>());
        assert!(reported(TaskError::Store(StoreError::AuthRevoked)).is::<Reported>());
        assert!(!reported(TaskError::NotFound("abc".into())).is::<Reported>());
    }
}
