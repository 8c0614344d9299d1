/*
 * Manages the tunables used when ingesting folders: how deep directory trees
 * are rendered, which directory names are never expanded, which file
 * extensions count as text when flattening, and which relative prefixes are
 * skipped entirely. The settings live in an optional `config.json` next to
 * the state file; a missing file or missing fields fall back to defaults.
 *
 * It uses a trait-based approach (`ConfigManagerOperations`) so the logic
 * layer can be tested against an in-memory configuration, with
 * `CoreConfigManager` handling the file system.
 */
use crate::core::path_utils;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "config.json";

pub const DEFAULT_MAX_TREE_DEPTH: usize = 3;

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Serde(serde_json::Error),
    NoConfigDirectory,
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Serde(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Configuration I/O error: {e}"),
            ConfigError::Serde(e) => write!(f, "Configuration file format error: {e}"),
            ConfigError::NoConfigDirectory => {
                write!(f, "Could not determine configuration directory")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Serde(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct YapConfig {
    pub max_tree_depth: usize,
    pub excluded_dir_names: Vec<String>,
    pub text_extensions: Vec<String>,
    pub blocked_prefixes: Vec<String>,
}

impl Default for YapConfig {
    fn default() -> Self {
        YapConfig {
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
            excluded_dir_names: ["node_modules", ".git", "dist", "build"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            text_extensions: vec![".js".to_string(), ".md".to_string()],
            blocked_prefixes: vec!["src/locale".to_string()],
        }
    }
}

pub trait ConfigManagerOperations: Send + Sync {
    fn load_config(&self) -> Result<YapConfig>;
    fn save_config(&self, config: &YapConfig) -> Result<()>;
}

pub struct CoreConfigManager {
    config_path: PathBuf,
}

impl CoreConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        CoreConfigManager { config_path }
    }

    /*
     * Places `config.json` in the application's local configuration directory
     * as resolved by `path_utils`.
     */
    pub fn for_app(app_name: &str) -> Result<Self> {
        let dir = path_utils::get_base_app_config_local_dir(app_name)
            .ok_or(ConfigError::NoConfigDirectory)?;
        Ok(CoreConfigManager::new(dir.join(CONFIG_FILENAME)))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

impl ConfigManagerOperations for CoreConfigManager {
    fn load_config(&self) -> Result<YapConfig> {
        let file_path = &self.config_path;
        log::trace!("CoreConfigManager: Loading configuration from {file_path:?}");
        if !file_path.exists() {
            log::debug!("CoreConfigManager: {file_path:?} does not exist, using defaults.");
            return Ok(YapConfig::default());
        }
        let reader = BufReader::new(File::open(file_path)?);
        let config: YapConfig = serde_json::from_reader(reader)?;
        log::debug!("CoreConfigManager: Loaded configuration {config:?} from {file_path:?}.");
        Ok(config)
    }

    fn save_config(&self, config: &YapConfig) -> Result<()> {
        let file_path = &self.config_path;
        if let Some(parent) = file_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(file_path)?);
        serde_json::to_writer_pretty(&mut writer, config)?;
        writer.flush()?;
        log::debug!("CoreConfigManager: Saved configuration to {file_path:?}.");
        Ok(())
    }
}

/*
 * Loads the configuration, degrading to defaults when the file is unreadable
 * or malformed. Startup never fails because of the configuration.
 */
pub fn load_or_default(manager: &dyn ConfigManagerOperations) -> YapConfig {
    match manager.load_config() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Config: Falling back to default configuration: {e}");
            YapConfig::default()
        }
    }
}
