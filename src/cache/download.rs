//! Fetch strategies plugged into the module cache
//!
//! The cache never talks to a target itself. Callers supply a
//! [`ModuleDownloader`] for module binaries and optionally a
//! [`SymfileDownloader`] for separate debug-symbol artifacts. Both write into
//! a destination path chosen by the cache; on failure the destination's
//! contents are ignored.

use crate::error::BoxError;
use crate::filespec::{FileSpec, FileSpecList};
use crate::module::{Module, ModuleSpec, ModuleUuid};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Fetches a module binary into `dest`
pub trait ModuleDownloader: Send + Sync {
    fn download_module(&self, spec: &ModuleSpec, dest: &Path) -> Result<(), BoxError>;
}

/// Fetches the debug-symbol artifact of `module` into `dest`
pub trait SymfileDownloader: Send + Sync {
    fn download_symfile(&self, module: &Module, dest: &Path) -> Result<(), BoxError>;
}

impl<F> ModuleDownloader for F
where
    F: Fn(&ModuleSpec, &Path) -> Result<(), BoxError> + Send + Sync,
{
    fn download_module(&self, spec: &ModuleSpec, dest: &Path) -> Result<(), BoxError> {
        self(spec, dest)
    }
}

impl<F> SymfileDownloader for F
where
    F: Fn(&Module, &Path) -> Result<(), BoxError> + Send + Sync,
{
    fn download_symfile(&self, module: &Module, dest: &Path) -> Result<(), BoxError> {
        self(module, dest)
    }
}

/// Resolves the identity of a downloaded module whose spec had no UUID
pub trait IdentityProbe: Send + Sync {
    fn probe(&self, file: &Path) -> io::Result<ModuleUuid>;
}

/// Identity from content: first 16 bytes of the file's SHA-256.
///
/// Identical bytes always map to the same cache directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentDigestProbe;

impl IdentityProbe for ContentDigestProbe {
    fn probe(&self, file: &Path) -> io::Result<ModuleUuid> {
        let mut hasher = Sha256::new();
        io::copy(&mut File::open(file)?, &mut hasher)?;
        let digest = hasher.finalize();
        ModuleUuid::from_bytes(&digest[..16])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
    }
}

/// Serves modules from local mirrors of the target's filesystem.
///
/// A module `/lib/libc.so.6` is looked up as `<mirror>/lib/libc.so.6` in each
/// mirror in order; its symbols as
/// `<mirror>/usr/lib/debug/lib/libc.so.6.debug`.
#[derive(Debug, Clone, Default)]
pub struct MirrorDownloader {
    mirrors: FileSpecList,
}

impl MirrorDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mirror root; duplicates are ignored
    pub fn add_mirror(&mut self, root: impl AsRef<Path>) -> bool {
        self.mirrors.append_if_unique(FileSpec::new(root))
    }

    pub fn mirrors(&self) -> &FileSpecList {
        &self.mirrors
    }

    fn find(&self, relative: &Path) -> Option<PathBuf> {
        self.mirrors
            .iter()
            .map(|root| root.path().join(relative))
            .find(|candidate| candidate.is_file())
    }

    fn copy_from_mirror(&self, relative: &Path, dest: &Path) -> Result<(), BoxError> {
        let source = self.find(relative).ok_or_else(|| {
            let searched: Vec<String> = self.mirrors.iter().map(ToString::to_string).collect();
            format!(
                "{} not found in mirrors [{}]",
                relative.display(),
                searched.join(", ")
            )
        })?;
        debug!("Copying {} from mirror", source.display());
        fs::copy(&source, dest)?;
        Ok(())
    }
}

impl ModuleDownloader for MirrorDownloader {
    fn download_module(&self, spec: &ModuleSpec, dest: &Path) -> Result<(), BoxError> {
        self.copy_from_mirror(&target_relative(&spec.path), dest)
    }
}

impl SymfileDownloader for MirrorDownloader {
    fn download_symfile(&self, module: &Module, dest: &Path) -> Result<(), BoxError> {
        let mut relative = Path::new("usr/lib/debug").join(target_relative(&module.spec().path));
        let mut name = relative.file_name().unwrap_or_default().to_os_string();
        name.push(".debug");
        relative.set_file_name(name);
        self.copy_from_mirror(&relative, dest)
    }
}

/// Target path with root and prefix components removed
fn target_relative(path: &Path) -> PathBuf {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}
