//! Cache key derivation
//!
//! A key is the module UUID when known, otherwise a hash of the target path
//! and hostname. A hash of the full target path is always appended, so two
//! distinct files sharing one UUID never share a cache directory.

use crate::error::ModCacheResult;
use crate::module::{ModuleSpec, ModuleUuid};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;

/// Deterministic identity of a cached module
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    id: String,
    disambiguator: String,
    from_uuid: bool,
}

impl CacheKey {
    /// Derive the key for a module spec as seen from `hostname`
    pub fn derive(spec: &ModuleSpec, hostname: &str) -> ModCacheResult<Self> {
        spec.validate()?;
        Ok(match &spec.uuid {
            Some(uuid) => Self::for_uuid(uuid, &spec.path),
            None => Self {
                id: path_host_hash(&spec.path, hostname),
                disambiguator: disambiguator(&spec.path),
                from_uuid: false,
            },
        })
    }

    /// Key for a module whose UUID is known
    pub fn for_uuid(uuid: &ModuleUuid, full_path: &Path) -> Self {
        Self {
            id: uuid.to_string(),
            disambiguator: disambiguator(full_path),
            from_uuid: true,
        }
    }

    /// Whether the key names a stable UUID-view directory
    pub fn is_uuid(&self) -> bool {
        self.from_uuid
    }

    /// Directory name under `.cache`
    pub fn dir_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.id, self.disambiguator)
    }
}

/// Hash of a module's full original path, first 8 hex chars
pub fn disambiguator(full_path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(full_path.to_string_lossy().as_bytes());
    hex::encode_upper(&hasher.finalize()[..4])
}

fn path_host_hash(full_path: &Path, hostname: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(full_path.to_string_lossy().as_bytes());
    hasher.update([0u8]);
    hasher.update(hostname.as_bytes());
    hex::encode_upper(&hasher.finalize()[..8])
}
