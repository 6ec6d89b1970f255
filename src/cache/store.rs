//! Filesystem primitives for the module cache
//!
//! Module bytes are never written at their final location: downloads land in
//! a private temp file which is then renamed into place without clobbering.

use crate::error::{ModCacheError, ModCacheResult};
use std::fs;
use std::io;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Prefix of in-flight download files inside the UUID-view directory
const TEMP_PREFIX: &str = ".tmp";

/// Outcome of an atomic placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The temp file was renamed into place
    Placed,
    /// Another writer got there first; the temp file was discarded
    AlreadyPresent,
}

/// Whether anything exists at `path` (following symlinks)
pub fn exists(path: &Path) -> bool {
    path.exists()
}

/// Create a private temp file in `dir`, creating the directory if needed.
///
/// The file is removed when dropped unless it has been placed.
pub fn temp_file(dir: &Path) -> ModCacheResult<NamedTempFile> {
    fs::create_dir_all(dir).map_err(|e| ModCacheError::placement(dir, e))?;
    tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(dir)
        .map_err(|e| ModCacheError::placement(dir, e))
}

/// Atomically move `tmp` to `final_path`.
///
/// Placement is idempotent: if `final_path` already exists the temp file is
/// dropped and the call still succeeds.
pub fn atomic_place(tmp: NamedTempFile, final_path: &Path) -> ModCacheResult<Placement> {
    if let Some(parent) = final_path.parent() {
        fs::create_dir_all(parent).map_err(|e| ModCacheError::placement(parent, e))?;
    }

    if exists(final_path) {
        debug!("{} already present, discarding download", final_path.display());
        return Ok(Placement::AlreadyPresent);
    }

    match tmp.persist_noclobber(final_path) {
        Ok(_) => Ok(Placement::Placed),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
            debug!("Lost placement race for {}", final_path.display());
            Ok(Placement::AlreadyPresent)
        }
        Err(e) => Err(ModCacheError::placement(final_path, e.error)),
    }
}

/// Point `sysroot_path` at `uuid_path`, replacing whatever was there.
///
/// Errors are returned to the caller to be reported as warnings; the UUID
/// view alone is enough to satisfy future lookups.
pub fn link_sysroot(sysroot_path: &Path, uuid_path: &Path) -> io::Result<()> {
    if let Some(parent) = sysroot_path.parent() {
        fs::create_dir_all(parent)?;
    }

    match fs::symlink_metadata(sysroot_path) {
        Ok(meta) if meta.file_type().is_symlink() && points_to(sysroot_path, uuid_path) => {
            return Ok(());
        }
        Ok(meta) if meta.is_dir() => ignore_missing(fs::remove_dir_all(sysroot_path))?,
        Ok(_) => ignore_missing(fs::remove_file(sysroot_path))?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    match symlink(uuid_path, sysroot_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            // A concurrent writer recreated the link; fine if it agrees with us
            if fs::read_link(sysroot_path)? == uuid_path {
                Ok(())
            } else {
                Err(e)
            }
        }
        Err(e) => Err(e),
    }
}

fn points_to(link: &Path, target: &Path) -> bool {
    fs::read_link(link).is_ok_and(|current| current.as_path() == target)
}

/// Another writer may remove the same entry first
fn ignore_missing(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}
