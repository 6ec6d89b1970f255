//! Configuration schema for modcache
//!
//! Configuration is stored at `~/.config/modcache/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Module cache settings
    pub cache: CacheConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// Module cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root directory
    pub root: PathBuf,

    /// Platform name used when none is given, e.g. "remote-linux"
    pub platform: String,

    /// Hostname of the target, names the sysroot view
    pub hostname: String,

    /// Local mirrors of the target filesystem, searched in order
    pub mirrors: Vec<PathBuf>,

    /// Fetch separate debug-symbol files alongside modules
    pub symbols: bool,
}

impl CacheConfig {
    /// Default cache root under the user cache directory
    pub fn default_root() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("modcache")
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: Self::default_root(),
            platform: "host".to_string(),
            hostname: "localhost".to_string(),
            mirrors: vec![],
            symbols: true,
        }
    }
}
