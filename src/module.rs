//! Module identity types
//!
//! A [`ModuleSpec`] names a module on the remote target; a [`Module`] is the
//! local, materialized copy handed out by the cache.

use crate::error::{ModCacheError, ModCacheResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

/// Byte offsets after which a dash is inserted when formatting a UUID
const DASH_OFFSETS: [usize; 5] = [4, 6, 8, 10, 16];

/// Opaque module identity (16-byte UUID or 20-byte build-id)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleUuid(Vec<u8>);

impl ModuleUuid {
    /// Create from raw bytes
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> ModCacheResult<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(ModCacheError::InvalidSpec("empty UUID".to_string()));
        }
        Ok(Self(bytes))
    }

    /// Raw identity bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for ModuleUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if DASH_OFFSETS.contains(&i) {
                f.write_str("-")?;
            }
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

impl FromStr for ModuleUuid {
    type Err = ModCacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.chars().filter(|c| *c != '-').collect();
        let bytes = hex::decode(&digits)
            .map_err(|e| ModCacheError::InvalidSpec(format!("malformed UUID {:?}: {}", s, e)))?;
        Self::from_bytes(bytes)
    }
}

impl Serialize for ModuleUuid {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ModuleUuid {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Identifies a module on the remote target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSpec {
    /// Full original path on the target
    pub path: PathBuf,
    /// Platform name, e.g. `remote-linux`
    pub platform: String,
    /// Architecture triple, if known
    pub arch: Option<String>,
    /// Module UUID, if known before fetch
    pub uuid: Option<ModuleUuid>,
}

impl ModuleSpec {
    /// Create a spec for a path on the given platform
    pub fn new(path: impl Into<PathBuf>, platform: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            platform: platform.into(),
            arch: None,
            uuid: None,
        }
    }

    /// Attach a known UUID
    pub fn with_uuid(mut self, uuid: ModuleUuid) -> Self {
        self.uuid = Some(uuid);
        self
    }

    /// Attach an architecture
    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = Some(arch.into());
        self
    }

    /// File name component of the target path
    pub fn filename(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }

    /// Check the spec carries enough information to build cache paths
    pub fn validate(&self) -> ModCacheResult<()> {
        if self.platform.is_empty() {
            return Err(ModCacheError::InvalidSpec(format!(
                "no platform for {}",
                self.path.display()
            )));
        }
        match self.filename() {
            Some(name) if !name.is_empty() => {}
            _ => {
                return Err(ModCacheError::InvalidSpec(format!(
                    "no filename in {:?}",
                    self.path
                )))
            }
        }
        if self
            .path
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(ModCacheError::InvalidSpec(format!(
                "parent directory component in {}",
                self.path.display()
            )));
        }
        Ok(())
    }
}

impl fmt::Display for ModuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())?;
        if let Some(arch) = &self.arch {
            write!(f, " [{}]", arch)?;
        }
        if let Some(uuid) = &self.uuid {
            write!(f, " ({})", uuid)?;
        }
        Ok(())
    }
}

/// A module materialized in the local cache
#[derive(Debug)]
pub struct Module {
    spec: ModuleSpec,
    file: PathBuf,
    uuid: ModuleUuid,
    symbol_file: OnceLock<PathBuf>,
}

impl Module {
    /// Create a module backed by a UUID-view file
    pub fn new(spec: ModuleSpec, file: PathBuf, uuid: ModuleUuid) -> Self {
        Self {
            spec,
            file,
            uuid,
            symbol_file: OnceLock::new(),
        }
    }

    /// The spec this module was requested with
    pub fn spec(&self) -> &ModuleSpec {
        &self.spec
    }

    /// Local file holding the module bytes (UUID view)
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Resolved module identity
    pub fn uuid(&self) -> &ModuleUuid {
        &self.uuid
    }

    /// Locally cached debug-symbol artifact, if any
    pub fn symbol_file(&self) -> Option<&Path> {
        self.symbol_file.get().map(PathBuf::as_path)
    }

    /// Record the symbol file location. Only the first call has an effect.
    pub(crate) fn set_symbol_file(&self, path: PathBuf) {
        let _ = self.symbol_file.set(path);
    }
}
