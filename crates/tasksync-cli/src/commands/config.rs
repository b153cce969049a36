//! Config command handlers

use std::path::PathBuf;

use anyhow::{Context, Result};

use tasksync_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "database_url": config.database_url,
                    "auth_token": config.auth_token.as_ref().map(|_| "(set)"),
                    "tasks_path": config.tasks_path,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.database_url.as_deref().unwrap_or_default());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!(
                "  database_url: {}",
                config.database_url.as_deref().unwrap_or("(not set)")
            );
            println!(
                "  auth_token:   {}",
                if config.auth_token.is_some() {
                    "(set)"
                } else {
                    "(not set)"
                }
            );
            println!("  tasks_path:   {}", config.tasks_path);
            println!(
                "  log_file:     {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    config.set(&key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    let shown = if key == "auth_token" && !value.is_empty() {
        "(set)"
    } else {
        value.as_str()
    };
    output.success(&format!("Set {} = {}", key, shown));

    Ok(())
}
