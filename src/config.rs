// Configuration loaded from YAML with CLI overrides

use crate::reconciler::DEFAULT_NAME_MAX_LEN;
use crate::store::{DEFAULT_TABLE, TaskStore};
use eyre::{Context, Result, eyre};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "taskpro";
const CONFIG_FILE: &str = "config.yml";
const DB_FILE: &str = "taskpro.db";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file
    pub database: PathBuf,
    /// Table holding the tasks
    pub table: String,
    /// Longest accepted task name, in characters
    pub name_max_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        let database = dirs::data_dir()
            .map(|dir| dir.join(APP_DIR).join(DB_FILE))
            .unwrap_or_else(|| PathBuf::from(DB_FILE));

        Self {
            database,
            table: DEFAULT_TABLE.to_string(),
            name_max_len: DEFAULT_NAME_MAX_LEN,
        }
    }
}

impl Config {
    /// Default location of the config file, if the platform has one
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load configuration
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used when present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        debug!(path = ?path, "Loaded config file");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Apply command line overrides
    pub fn with_overrides(mut self, database: Option<PathBuf>, table: Option<String>) -> Result<Self> {
        if let Some(database) = database {
            self.database = database;
        }
        if let Some(table) = table {
            self.table = table;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        TaskStore::validate_table_name(&self.table)?;
        if self.name_max_len == 0 {
            return Err(eyre!("name_max_len must be at least 1"));
        }
        Ok(())
    }
}
