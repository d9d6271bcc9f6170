use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
///
/// Loaded from `config.toml`; anything missing falls back to the defaults
/// below, so an empty file is a valid config.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
}

impl Config {
    /// Load config from default location, defaults if there's no file yet
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            // No config file? Use defaults
            Ok(Self::default())
        }
    }

    /// Save config to disk
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// `<config_dir>/closewatch/config.toml`
    pub fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?;

        Ok(config_dir.join("closewatch").join("config.toml"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Registry root, plugin pages live under `/plugins/<slug>/`
    #[serde(default = "default_registry_url")]
    pub base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_registry_url() -> String {
    closewatch_api::DEFAULT_REGISTRY_URL.to_string()
}

fn default_user_agent() -> String {
    concat!("closewatch/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout() -> u64 {
    10
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: default_registry_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Minimum hours between throttled refreshes
    #[serde(default = "default_interval")]
    pub interval_hours: u64,

    /// Registry requests in flight during a pass
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_interval() -> u64 {
    crate::scheduler::DEFAULT_REFRESH_INTERVAL_HOURS as u64
}

fn default_concurrency() -> usize {
    crate::scheduler::DEFAULT_CONCURRENCY
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_hours: default_interval(),
            concurrency: default_concurrency(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// SQLite file, defaults to `<cache_dir>/closewatch/cache.db`
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Prefix of the record key, the record lives under `<prefix>_closed`
    #[serde(default = "default_app_prefix")]
    pub app_prefix: String,
}

fn default_app_prefix() -> String {
    "closewatch".to_string()
}

impl CacheConfig {
    pub fn resolved_db_path(&self) -> crate::Result<PathBuf> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }

        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find cache directory".into()))?;
        Ok(cache_dir.join("closewatch").join("cache.db"))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            app_prefix: default_app_prefix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// JSON map of installed plugin identifier -> metadata
    #[serde(default = "default_installed_path")]
    pub installed_path: PathBuf,

    /// JSON result of the host's last update check
    #[serde(default = "default_update_status_path")]
    pub update_status_path: PathBuf,
}

fn default_installed_path() -> PathBuf {
    PathBuf::from("installed.json")
}

fn default_update_status_path() -> PathBuf {
    PathBuf::from("update_status.json")
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            installed_path: default_installed_path(),
            update_status_path: default_update_status_path(),
        }
    }
}
