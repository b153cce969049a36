//! Task command handlers

use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use tracing::debug;

use tasksync_core::{deadline, Config, Subscription, Task, TaskList};

use super::{load_list, open_store, reported, CliList};
use crate::output::Output;

/// How long `done`/`undone` wait for the change to come back
const CONFIRM_TIMEOUT: Duration = Duration::from_secs(5);

/// List all tasks in display order
pub async fn list(config: &Config, output: &Output) -> Result<()> {
    // The first snapshot renders the list through the view
    load_list(config, output.clone().showing_list()).await?;
    Ok(())
}

/// Create a new task
pub async fn add(
    config: &Config,
    title: String,
    description: Option<String>,
    deadline: String,
    output: &Output,
) -> Result<()> {
    let deadline = normalize_deadline(&deadline)?;

    let store = open_store(config)?;
    let mut list = TaskList::with_path(store, save_view(output), config.tasks_path.clone());

    let task = list
        .create_or_update(None, &title, description.as_deref().unwrap_or(""), &deadline)
        .await
        .map_err(reported)?;

    output.print_task(&task);
    Ok(())
}

/// Edit a task; fields not given keep their current values
pub async fn edit(
    config: &Config,
    id: String,
    title: Option<String>,
    description: Option<String>,
    deadline: Option<String>,
    output: &Output,
) -> Result<()> {
    let (mut list, _subscription) = load_list(config, save_view(output)).await?;
    let task = list.find(&id)?.clone();

    let title = title.unwrap_or_else(|| task.title.clone());
    let description = description.unwrap_or_else(|| task.description.clone());
    let deadline = match deadline {
        Some(input) => normalize_deadline(&input)?,
        None => task.deadline.clone(),
    };

    let saved = list
        .create_or_update(Some(&task), &title, &description, &deadline)
        .await
        .map_err(reported)?;

    output.print_task(&saved);
    Ok(())
}

/// Delete a task
pub async fn delete(config: &Config, id: String, yes: bool, output: &Output) -> Result<()> {
    let (mut list, _subscription) = load_list(config, output.clone()).await?;
    let task = list.find(&id)?.clone();

    // Confirm deletion
    if output.should_prompt() && !yes {
        println!("Delete task: {} - {}", task.short_id(), task.title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    list.delete(&task).await.map_err(reported)?;
    Ok(())
}

/// Check or uncheck a task
///
/// The write itself is fire-and-forget, so success is reported only once the
/// change shows up in a snapshot.
pub async fn set_completed(config: &Config, id: String, value: bool, output: &Output) -> Result<()> {
    let (mut list, mut subscription) = load_list(config, output.clone()).await?;
    let task = list.find(&id)?.clone();

    if task.completed == value {
        output.message(&format!(
            "'{}' is already {}",
            task.title,
            state_name(value)
        ));
        return Ok(());
    }

    list.set_completed(&task, value).await;

    if await_completed(&mut list, &mut subscription, &task, value).await {
        output.success(&format!("Marked '{}' {}", task.title, state_name(value)));
    } else {
        anyhow::bail!(
            "Change to '{}' was not confirmed by the database. Run with --verbose for details.",
            task.title
        );
    }

    Ok(())
}

/// Apply snapshots until the task shows `value`, or the wait times out
async fn await_completed(
    list: &mut CliList,
    subscription: &mut Subscription,
    task: &Task,
    value: bool,
) -> bool {
    let key = task.id.as_deref().unwrap_or_default();
    let wait = async {
        loop {
            if list.find(key).is_ok_and(|t| t.completed == value) {
                return true;
            }
            if list.sync_once(subscription).await.is_err() {
                return false;
            }
        }
    };

    match tokio::time::timeout(CONFIRM_TIMEOUT, wait).await {
        Ok(confirmed) => confirmed,
        Err(_) => {
            debug!("Timed out waiting for {} to become completed={}", key, value);
            false
        }
    }
}

/// View for add and edit, which print the saved task afterwards
///
/// In JSON mode the task is the only document written.
fn save_view(output: &Output) -> Output {
    if output.is_json() {
        output.clone().without_confirmations()
    } else {
        output.clone()
    }
}

fn state_name(completed: bool) -> &'static str {
    if completed {
        "done"
    } else {
        "not done"
    }
}

/// Turn deadline input into the stored form
///
/// Blank input is passed through so the task list reports the missing field.
fn normalize_deadline(input: &str) -> Result<String> {
    if input.trim().is_empty() {
        return Ok(String::new());
    }
    let today = Local::now().date_naive();
    Ok(deadline::parse_input(input, today)?)
}

/// Prompt for confirmation (y/n)
///
/// Returns false without asking when stdin is not a terminal.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !io::stdin().is_terminal() {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_deadline_passes_blank_through() {
        assert_eq!(normalize_deadline("").unwrap(), "");
        assert_eq!(normalize_deadline("   ").unwrap(), "");
    }

    #[test]
    fn test_normalize_deadline() {
        let today = Local::now().date_naive();
        assert_eq!(normalize_deadline("today").unwrap(), deadline::format(today));
        assert!(normalize_deadline("31/02/2030").is_err());
        assert!(normalize_deadline("01/01/2000").is_err());
    }

    #[test]
    fn test_save_view_prints_one_json_document() {
        use crate::output::OutputFormat;
        use tasksync_core::list::notices;
        use tasksync_core::TaskView;

        // A confirmation written through the JSON save view is dropped, so
        // only the task printed afterwards reaches stdout
        let mut json = save_view(&Output::new(OutputFormat::Json));
        assert!(json.is_json());
        assert!(!json.shows_confirmations());
        json.notify(notices::ADDED);

        assert!(save_view(&Output::new(OutputFormat::Human)).shows_confirmations());
    }

    #[test]
    fn test_state_name() {
        assert_eq!(state_name(true), "done");
        assert_eq!(state_name(false), "not done");
    }
}
