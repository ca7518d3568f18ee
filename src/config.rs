//! Configuration for r3 storage paths and selection settings.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (R3_HOME, R3_DATABASE, R3_MEDIA_ROOT,
//!    R3_MEDIA_URL, R3_MAX_MEDIA_COUNT)
//! 2. Config file (.r3/config.yaml)
//! 3. Defaults (~/.r3)
//!
//! Config file discovery:
//! - Searches current directory and parents for .r3/config.yaml
//! - Paths in config file are relative to the .r3/ directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::StateRetention;
use crate::domain::CatalogOrdering;
use crate::selectors::SelectionSettings;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const DEFAULT_MEDIA_URL: &str = "/media/";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub selection: Option<SelectionConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to .r3/)
    pub home: Option<String>,
    /// SQLite database file (relative to .r3/)
    pub database: Option<String>,
    /// Directory holding media bytes (relative to .r3/)
    pub media_root: Option<String>,
    /// URL prefix for media content
    pub media_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectionConfig {
    pub max_media_count: Option<usize>,
    pub catalog_ordering: Option<CatalogOrdering>,
    /// Keep only this many state log lines per Logic
    pub state_max_lines: Option<usize>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to r3 home
    pub home: PathBuf,
    /// SQLite database file
    pub database: PathBuf,
    /// Directory holding media bytes
    pub media_root: PathBuf,
    /// URL prefix for media content
    pub media_url: String,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Selector settings
    pub selection: SelectionSettings,
}

impl SelectionConfig {
    fn resolve(&self) -> SelectionSettings {
        let defaults = SelectionSettings::default();
        SelectionSettings {
            max_media_count: self.max_media_count.unwrap_or(defaults.max_media_count),
            catalog_ordering: self.catalog_ordering.unwrap_or(defaults.catalog_ordering),
            state_retention: self
                .state_max_lines
                .map(StateRetention::KeepLast)
                .unwrap_or(defaults.state_retention),
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".r3").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Parse R3_MAX_MEDIA_COUNT if set
fn env_max_media_count() -> Result<Option<usize>> {
    match std::env::var("R3_MAX_MEDIA_COUNT") {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid R3_MAX_MEDIA_COUNT: {}", raw)),
        Err(_) => Ok(None),
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".r3");

    let config_file = find_config_file();

    let (file_config, config_dir) = match config_file {
        Some(ref path) => (
            Some(load_config_file(path)?),
            path.parent().unwrap_or(Path::new(".")).to_path_buf(),
        ),
        None => (None, PathBuf::from(".")),
    };
    let paths = file_config
        .as_ref()
        .map(|c| c.paths.clone())
        .unwrap_or_default();

    let home = if let Ok(env_home) = std::env::var("R3_HOME") {
        PathBuf::from(env_home)
    } else if let Some(ref home_path) = paths.home {
        resolve_path(&config_dir, home_path)
    } else {
        default_home
    };

    let database = if let Ok(env_db) = std::env::var("R3_DATABASE") {
        PathBuf::from(env_db)
    } else if let Some(ref db_path) = paths.database {
        resolve_path(&config_dir, db_path)
    } else {
        home.join("r3.sqlite3")
    };

    let media_root = if let Ok(env_media) = std::env::var("R3_MEDIA_ROOT") {
        PathBuf::from(env_media)
    } else if let Some(ref media_path) = paths.media_root {
        resolve_path(&config_dir, media_path)
    } else {
        home.join("media")
    };

    let media_url = std::env::var("R3_MEDIA_URL")
        .ok()
        .or(paths.media_url)
        .unwrap_or_else(|| DEFAULT_MEDIA_URL.to_string());

    let mut selection = file_config
        .and_then(|c| c.selection)
        .unwrap_or_default()
        .resolve();
    if let Some(max) = env_max_media_count()? {
        selection.max_media_count = max;
    }

    Ok(ResolvedConfig {
        home,
        database,
        media_root,
        media_url,
        config_file,
        selection,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
