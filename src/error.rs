//! Error types for modcache
//!
//! All modules use `ModCacheResult<T>` as their return type. Soft failures
//! that do not invalidate a cached module are reported as [`CacheWarning`]s
//! attached to the successful result instead.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by downloader strategies
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for modcache operations
pub type ModCacheResult<T> = Result<T, ModCacheError>;

/// All errors that can occur in modcache
#[derive(Error, Debug)]
pub enum ModCacheError {
    // Cache errors
    #[error("Download failed for {module}: {source}")]
    Download {
        module: String,
        #[source]
        source: BoxError,
    },

    #[error("Failed to place {path}: {source}")]
    Placement {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid module spec: {0}")]
    InvalidSpec(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl ModCacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a placement error for a cache path
    pub fn placement(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Placement {
            path: path.into(),
            source,
        }
    }

    /// Wrap a downloader failure without altering it
    pub fn download(module: impl Into<String>, source: BoxError) -> Self {
        Self::Download {
            module: module.into(),
            source,
        }
    }

    /// Check if error is retryable
    ///
    /// Failed fetches are never cached, so a retry always starts from scratch.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Download { .. } | Self::Placement { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Download { .. } => Some("Check that the module exists in one of the --mirror roots"),
            Self::Placement { .. } => Some("Check permissions and free space of the cache root"),
            Self::InvalidSpec(_) => Some("Pass an absolute module path, e.g. /lib/libc.so.6"),
            Self::ConfigInvalid { .. } => Some("Run: modcache config init --force"),
            _ => None,
        }
    }
}

/// Non-fatal problems attached to an otherwise successful cache lookup
#[derive(Error, Debug)]
pub enum CacheWarning {
    #[error("failed to link sysroot view {path}: {source}")]
    SysrootLink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("symbol file download failed for {module}: {source}")]
    SymbolDownload {
        module: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to store symbol file: {source}")]
    SymbolPlacement {
        #[source]
        source: ModCacheError,
    },
}
