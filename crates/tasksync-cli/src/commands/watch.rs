//! Watch command handler

use anyhow::{Context, Result};
use tracing::info;

use tasksync_core::{Config, StoreError, TaskError};

use super::{load_list, reported};
use crate::output::Output;

/// Render the list on every change until Ctrl-C or the listener stops
pub async fn watch(config: &Config, output: &Output) -> Result<()> {
    let view = output.clone().showing_list().with_timestamps();
    let (mut list, mut subscription) = load_list(config, view).await?;

    info!("Watching '{}'", list.path());
    if output.should_prompt() {
        eprintln!("Watching for changes. Press Ctrl-C to stop.");
    }

    tokio::select! {
        last_error = list.run(&mut subscription) => {
            // The listener has already reported why it stopped
            Err(reported(TaskError::Store(stop_reason(last_error))))
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            info!("Stopped watching");
            Ok(())
        }
    }
}

/// Why the listener ended; a stream that closed without an error is reported
/// as a stream failure
fn stop_reason(last_error: Option<StoreError>) -> StoreError {
    last_error.unwrap_or_else(|| StoreError::Stream("listener stopped".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Reported;

    #[test]
    fn test_stop_reason_keeps_listener_error() {
        let reason = stop_reason(Some(StoreError::AuthRevoked));
        assert!(matches!(reason, StoreError::AuthRevoked));

        let hint = Reported(TaskError::Store(reason)).hint().unwrap();
        assert!(hint.contains("auth_token"));
    }

    #[test]
    fn test_stop_reason_without_error() {
        assert!(matches!(stop_reason(None), StoreError::Stream(_)));
    }
}
