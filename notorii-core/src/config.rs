//! YAML configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.notorii/
//!   config.yaml   (mode 0600, written by `notorii config init`)
//! ```
//!
//! Tokens never live in this file; each catalog section names the
//! environment variable its bearer token is read from.
//!
//! # API pattern
//!
//! Every function touching the filesystem takes an explicit `home: &Path`
//! (`fn_at`); tests pass a `TempDir`, callers pass [`home()`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};

pub const CONFIG_FILE: &str = "config.yaml";

/// Overrides the Notion database id from the environment.
pub const ENV_NOTION_DATABASE_ID: &str = "NOTION_DATABASE_ID";
/// Overrides the Torii base URL from the environment.
pub const ENV_TORII_URL: &str = "TORII_URL";

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub notion: NotionConfig,
    #[serde(default)]
    pub torii: ToriiConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotionConfig {
    pub base_url: String,
    /// Database holding one page per application. Required to run a pass.
    pub database_id: Option<String>,
    pub token_env: String,
    /// Value of the `Notion-Version` header.
    pub notion_version: String,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.notion.com".to_string(),
            database_id: None,
            token_env: "NOTION_TOKEN".to_string(),
            notion_version: "2022-06-28".to_string(),
        }
    }
}

impl NotionConfig {
    pub fn require_database_id(&self) -> Result<&str, ConfigError> {
        self.database_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(ConfigError::Missing("notion.database_id"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToriiConfig {
    pub base_url: String,
    pub token_env: String,
    /// Category assigned to custom apps created from Notion pages.
    pub custom_category: String,
}

impl Default for ToriiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9000".to_string(),
            token_env: "TORII_API_KEY".to_string(),
            custom_category: "Other".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
        }
    }
}

impl Config {
    /// Apply environment overrides. `lookup` is `std::env::var` in production.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(id) = lookup(ENV_NOTION_DATABASE_ID).filter(|v| !v.trim().is_empty()) {
            self.notion.database_id = Some(id);
        }
        if let Some(url) = lookup(ENV_TORII_URL).filter(|v| !v.trim().is_empty()) {
            self.torii.base_url = url;
        }
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<home>/.notorii/`
pub fn root_at(home: &Path) -> PathBuf {
    home.join(".notorii")
}

/// `<home>/.notorii/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    root_at(home).join(CONFIG_FILE)
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load `<home>/.notorii/config.yaml`, falling back to defaults when absent.
///
/// Returns `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// Load the file and apply process environment overrides.
pub fn load_effective_at(home: &Path) -> Result<Config, ConfigError> {
    let mut config = load_at(home)?;
    config.apply_env_overrides(|key| std::env::var(key).ok());
    Ok(config)
}

// ---------------------------------------------------------------------------
// Save
// ---------------------------------------------------------------------------

/// Write `config` to `<home>/.notorii/config.yaml`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, config: &Config) -> Result<PathBuf, ConfigError> {
    let dir = root_at(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
        set_dir_permissions(&dir)?;
    }
    let path = config_path_at(home);
    let yaml = serde_yaml::to_string(config)?;
    let tmp_path = path.with_file_name(format!("{CONFIG_FILE}.tmp"));
    std::fs::write(&tmp_path, yaml).map_err(|e| io_err(&tmp_path, e))?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path).map_err(|e| io_err(&path, e))?;
    Ok(path)
}

/// Write a default config, refusing to overwrite unless `force`.
pub fn init_at(home: &Path, force: bool) -> Result<PathBuf, ConfigError> {
    let path = config_path_at(home);
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists { path });
    }
    save_at(home, &Config::default())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
