//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/tasksync/config.toml)
//! 3. Environment variables (TASKSYNC_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::list::DEFAULT_PATH;

/// Environment variable prefix
const ENV_PREFIX: &str = "TASKSYNC";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Realtime database URL, e.g. https://<project>.firebaseio.com
    #[serde(default)]
    pub database_url: Option<String>,

    /// Database secret or ID token, sent as the `auth` parameter
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Location of the task records inside the database
    #[serde(default = "default_tasks_path")]
    pub tasks_path: String,

    /// Write logs here instead of stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            auth_token: None,
            tasks_path: default_tasks_path(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (TASKSYNC_DATABASE_URL, TASKSYNC_AUTH_TOKEN,
    ///    TASKSYNC_TASKS_PATH, TASKSYNC_LOG_FILE)
    /// 2. Config file (~/.config/tasksync/config.toml or TASKSYNC_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // TASKSYNC_DATABASE_URL
        if let Ok(val) = std::env::var(format!("{}_DATABASE_URL", ENV_PREFIX)) {
            self.database_url = non_empty(val);
        }

        // TASKSYNC_AUTH_TOKEN
        if let Ok(val) = std::env::var(format!("{}_AUTH_TOKEN", ENV_PREFIX)) {
            self.auth_token = non_empty(val);
        }

        // TASKSYNC_TASKS_PATH
        if let Ok(val) = std::env::var(format!("{}_TASKS_PATH", ENV_PREFIX)) {
            if !val.trim().is_empty() {
                self.tasks_path = val;
            }
        }

        // TASKSYNC_LOG_FILE
        if let Ok(val) = std::env::var(format!("{}_LOG_FILE", ENV_PREFIX)) {
            self.log_file = non_empty(val).map(PathBuf::from);
        }
    }

    /// Set a value by key, as given on the command line
    ///
    /// An empty value or `none` clears optional keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = if value == "none" { "" } else { value };
        match key {
            "database_url" => {
                let url = value.trim();
                if !url.is_empty() && !url.starts_with("https://") && !url.starts_with("http://") {
                    bail!("database_url must start with https:// or http://");
                }
                self.database_url = non_empty(url.to_string());
            }
            "auth_token" => self.auth_token = non_empty(value.to_string()),
            "tasks_path" => {
                if value.trim().is_empty() {
                    bail!("tasks_path cannot be empty");
                }
                self.tasks_path = value.trim().to_string();
            }
            "log_file" => self.log_file = non_empty(value.to_string()).map(PathBuf::from),
            _ => bail!(
                "Unknown config key: {}. Valid keys: database_url, auth_token, tasks_path, log_file",
                key
            ),
        }
        Ok(())
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with TASKSYNC_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tasksync")
            .join("config.toml")
    }
}

fn default_tasks_path() -> String {
    DEFAULT_PATH.to_string()
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "TASKSYNC_DATABASE_URL",
        "TASKSYNC_AUTH_TOKEN",
        "TASKSYNC_TASKS_PATH",
        "TASKSYNC_LOG_FILE",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.database_url.is_none());
        assert!(config.auth_token.is_none());
        assert_eq!(config.tasks_path, "tasks");
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_env_override_database_url() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("TASKSYNC_DATABASE_URL", "https://demo.firebaseio.com");
        config.apply_env_overrides();
        assert_eq!(
            config.database_url.as_deref(),
            Some("https://demo.firebaseio.com")
        );

        // Empty string clears it
        env::set_var("TASKSYNC_DATABASE_URL", "");
        config.apply_env_overrides();
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_env_override_tasks_path_ignores_blank() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("TASKSYNC_TASKS_PATH", "users/me/tasks");
        config.apply_env_overrides();
        assert_eq!(config.tasks_path, "users/me/tasks");

        env::set_var("TASKSYNC_TASKS_PATH", " ");
        config.apply_env_overrides();
        assert_eq!(config.tasks_path, "users/me/tasks");
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            database_url = "https://demo.firebaseio.com"
            auth_token = "secret"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(
            config.database_url.as_deref(),
            Some("https://demo.firebaseio.com")
        );
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.tasks_path, "tasks");
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config::load_from_path(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("database_url", "https://demo.firebaseio.com").unwrap();
        config.set("tasks_path", "todo").unwrap();
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_set_validates() {
        let mut config = Config::default();
        assert!(config.set("database_url", "demo.firebaseio.com").is_err());
        assert!(config.set("tasks_path", "").is_err());
        assert!(config.set("colour", "blue").is_err());

        config.set("auth_token", "t").unwrap();
        config.set("auth_token", "").unwrap();
        assert!(config.auth_token.is_none());

        config.set("log_file", "/tmp/tasksync.log").unwrap();
        config.set("log_file", "none").unwrap();
        assert!(config.log_file.is_none());
    }
}
