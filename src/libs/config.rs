//! Configuration management for the workshop application.
//!
//! The configuration is a small JSON file (`config.json`) in the data
//! directory resolved by [`DataStorage`]. Every module is optional; a missing
//! file or module means defaults.
//!
//! ## Modules
//!
//! - **storage**: where the SQLite database lives
//! - **sessions**: defaults used when scheduling and listing sessions
//!
//! ```rust,no_run
//! use workshop::libs::config::Config;
//!
//! let config = Config::read()?;
//! println!("Database: {}", config.database_path()?.display());
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::msg_print;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input, MultiSelect};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Database file name used when no `storage.database_path` is configured.
pub const DB_FILE_NAME: &str = "workshop.db";

/// Number of recently completed sessions listed by default.
pub const DEFAULT_RECENT_LIMIT: u32 = 10;

/// A module offered by the interactive setup.
#[derive(Debug, Clone)]
pub struct ConfigModule {
    pub key: String,
    pub name: String,
}

/// Location of the workshop database.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StorageConfig {
    /// Absolute path of the SQLite file.
    pub database_path: String,
}

/// Defaults for scheduling and listing sessions.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Instructor filled in when `session schedule` gets no `--instructor`.
    pub default_instructor: String,
    /// How many completed sessions `session list --recent` shows.
    pub recent_limit: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            default_instructor: String::new(),
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sessions: Option<SessionConfig>,
}

impl Config {
    /// Loads the configuration, falling back to defaults when no file exists.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;

        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;

        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Removes the configuration file if present.
    pub fn delete() -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        if config_file_path.exists() {
            fs::remove_file(config_file_path)?;
        }
        Ok(())
    }

    /// Configured database path, or `workshop.db` in the data directory.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.storage {
            Some(storage) if !storage.database_path.trim().is_empty() => Ok(PathBuf::from(&storage.database_path)),
            _ => Ok(DataStorage::new().get_path(DB_FILE_NAME)?),
        }
    }

    pub fn session_defaults(&self) -> SessionConfig {
        self.sessions.clone().unwrap_or_default()
    }

    /// Interactive setup wizard; existing values are offered as defaults.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let modules = vec![
            ConfigModule {
                key: "storage".to_string(),
                name: "Storage".to_string(),
            },
            ConfigModule {
                key: "sessions".to_string(),
                name: "Sessions".to_string(),
            },
        ];

        let selected = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&modules.iter().map(|module| &module.name).collect::<Vec<_>>())
            .interact()?;

        for &selection in &selected {
            match modules[selection].key.as_str() {
                "storage" => {
                    let default = match &config.storage {
                        Some(storage) => storage.database_path.clone(),
                        None => config.database_path()?.display().to_string(),
                    };
                    msg_print!(Message::ConfigModuleStorage);
                    config.storage = Some(StorageConfig {
                        database_path: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptDatabasePath.to_string())
                            .default(default)
                            .interact_text()?,
                    });
                }
                "sessions" => {
                    let default = config.session_defaults();
                    msg_print!(Message::ConfigModuleSessions);
                    config.sessions = Some(SessionConfig {
                        default_instructor: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptDefaultInstructor.to_string())
                            .default(default.default_instructor)
                            .allow_empty(true)
                            .interact_text()?,
                        recent_limit: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptRecentLimit.to_string())
                            .default(default.recent_limit)
                            .interact_text()?,
                    });
                }
                _ => {}
            }
        }

        Ok(config)
    }
}
