//! Store configuration.
//!
//! Loaded from TOML files; every field has a default so partial files work.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::DEFAULT_EXTENSION;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "TABLESTORE_CONFIG";

/// Where and how database files are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding `<name>.<extension>` database files.
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,

    /// File extension for database files, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// fsync the file and directory on save.
    #[serde(default = "default_sync_writes")]
    pub sync_writes: bool,
}

/// The user's documents directory, falling back to `~/Documents` and then
/// the working directory.
pub fn default_save_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_sync_writes() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            save_dir: default_save_dir(),
            extension: default_extension(),
            sync_writes: default_sync_writes(),
        }
    }
}

impl StoreConfig {
    /// Default configuration rooted at `save_dir`.
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self::default().with_save_dir(save_dir)
    }

    pub fn with_save_dir(mut self, save_dir: impl Into<PathBuf>) -> Self {
        self.save_dir = save_dir.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    /// Loads configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Saves configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Loads the default configuration file.
    ///
    /// Looks in the following locations:
    /// 1. `$TABLESTORE_CONFIG`
    /// 2. `<config dir>/tablestore/config.toml`
    /// 3. Returns default if not found
    pub fn load_default() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }

        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("tablestore").join("config.toml"))
    }
}
