//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)
//!
//! `Output` is also the display layer of the task list: snapshots and
//! notifications are rendered through it.

use chrono::Local;
use tasksync_core::list::notices;
use tasksync_core::{Task, TaskView};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
#[derive(Debug, Clone)]
pub struct Output {
    /// The output format
    pub format: OutputFormat,
    /// Print the list when a snapshot arrives
    show_list: bool,
    /// Prefix each rendered list with the time it arrived
    timestamps: bool,
    /// Print "Task added" and similar confirmations
    confirmations: bool,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            show_list: false,
            timestamps: false,
            confirmations: true,
        }
    }

    /// Render every snapshot that reaches this view
    pub fn showing_list(mut self) -> Self {
        self.show_list = true;
        self
    }

    /// Stamp each rendered list with the local time
    pub fn with_timestamps(mut self) -> Self {
        self.timestamps = true;
        self
    }

    /// Leave confirmations out; failures are still shown
    pub fn without_confirmations(mut self) -> Self {
        self.confirmations = false;
        self
    }

    /// Whether "Task added" and similar confirmations are printed
    pub fn shows_confirmations(&self) -> bool {
        self.confirmations
    }

    /// Check if output is JSON
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print a single task
    pub fn print_task(&self, task: &Task) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", task.id.as_deref().unwrap_or("-"));
                println!("Title:       {}", task.title);
                if !task.description.is_empty() {
                    println!("Description: {}", task.description);
                }
                println!("Deadline:    {}", task.deadline);
                println!("Completed:   {}", if task.completed { "yes" } else { "no" });
            }
            OutputFormat::Json => {
                println!("{}", task_json(task));
            }
            OutputFormat::Quiet => {
                println!("{}", task.id.as_deref().unwrap_or_default());
            }
        }
    }

    /// Print a list of tasks
    pub fn print_tasks(&self, tasks: &[Task]) {
        match self.format {
            OutputFormat::Human => {
                if tasks.is_empty() {
                    return;
                }
                for task in tasks {
                    println!("{}", format_row(task));
                }
                let open = tasks.iter().filter(|t| !t.completed).count();
                println!("\n{} task(s), {} open", tasks.len(), open);
            }
            OutputFormat::Json => {
                let json: Vec<_> = tasks.iter().map(task_json).collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json).unwrap_or_else(|_| "[]".into())
                );
            }
            OutputFormat::Quiet => {
                for task in tasks {
                    println!("{}", task.id.as_deref().unwrap_or_default());
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

impl TaskView for Output {
    fn render_list(&mut self, tasks: &[Task]) {
        if !self.show_list {
            return;
        }
        if self.timestamps && self.format == OutputFormat::Human {
            println!("── {} ──", Local::now().format("%H:%M:%S"));
        }
        self.print_tasks(tasks);
    }

    fn render_empty_state(&mut self, is_empty: bool) {
        if self.show_list && is_empty && self.format == OutputFormat::Human {
            println!("No tasks yet. Add one with `tasksync add <title> --deadline <date>`.");
        }
    }

    fn notify(&mut self, message: &str) {
        if is_confirmation(message) {
            if self.shows_confirmations() {
                self.success(message);
            }
            return;
        }

        // Failures are shown even in quiet mode
        match self.format {
            OutputFormat::Json => {
                eprintln!("{}", serde_json::json!({"status": "error", "message": message}))
            }
            _ => eprintln!("✗ {}", message),
        }
    }
}

fn is_confirmation(message: &str) -> bool {
    [notices::ADDED, notices::UPDATED, notices::DELETED].contains(&message)
}

fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "title": task.title,
        "description": task.description,
        "deadline": task.deadline,
        "completed": task.completed,
    })
}

/// One list line: checkbox, short id, deadline, title and description
fn format_row(task: &Task) -> String {
    let check = if task.completed { "[x]" } else { "[ ]" };
    let mut row = format!(
        "{} {:<8} | {:<10} | {}",
        check,
        task.short_id(),
        task.deadline,
        truncate(&task.title, 40)
    );
    if !task.description.is_empty() {
        row.push_str(" - ");
        row.push_str(&truncate_line(&task.description, 40));
    }
    row
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}
