//! The module cache facade
//!
//! Lookups go memory → disk (UUID view) → downloader. At most one
//! fetch-and-place sequence runs per key at a time; callers for the same key
//! wait for it and then reuse its result. Callers for distinct keys never
//! block each other.

use crate::cache::download::{ContentDigestProbe, IdentityProbe, ModuleDownloader, SymfileDownloader};
use crate::cache::index::ModuleIndex;
use crate::cache::inflight::{Claim, InFlightTable};
use crate::cache::key::CacheKey;
use crate::cache::layout;
use crate::cache::store::{self, Placement};
use crate::error::{CacheWarning, ModCacheError, ModCacheResult};
use crate::module::{Module, ModuleSpec};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of [`ModuleCache::get_and_put`]
#[derive(Debug)]
pub struct CacheOutcome {
    /// The cached module
    pub module: Arc<Module>,
    /// Whether this call downloaded the module
    pub created: bool,
    /// Soft failures that did not prevent caching
    pub warnings: Vec<CacheWarning>,
}

impl CacheOutcome {
    fn hit(module: Arc<Module>) -> Self {
        Self {
            module,
            created: false,
            warnings: Vec::new(),
        }
    }
}

/// Process-local module cache.
///
/// Owned by the hosting application; the in-memory index lives and dies
/// with this value, while the on-disk views persist across runs.
pub struct ModuleCache {
    index: ModuleIndex,
    inflight: InFlightTable,
    probe: Box<dyn IdentityProbe>,
}

impl Default for ModuleCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleCache {
    /// Create a cache that identifies UUID-less downloads by content digest
    pub fn new() -> Self {
        Self::with_probe(ContentDigestProbe)
    }

    /// Create a cache with a custom identity probe for UUID-less downloads
    pub fn with_probe(probe: impl IdentityProbe + 'static) -> Self {
        Self {
            index: ModuleIndex::new(),
            inflight: InFlightTable::new(),
            probe: Box::new(probe),
        }
    }

    /// Modules currently recorded in memory (live or not yet found stale)
    pub fn loaded_count(&self) -> usize {
        self.index.len()
    }

    /// Return the cached module for `spec`, downloading it if necessary.
    ///
    /// Download and placement failures abort the call and leave no trace in
    /// the cache, so the next call retries. Sysroot-link and symbol-file
    /// failures are returned as warnings on a successful outcome.
    pub fn get_and_put(
        &self,
        root: &Path,
        hostname: &str,
        spec: &ModuleSpec,
        module_downloader: &dyn ModuleDownloader,
        symfile_downloader: Option<&dyn SymfileDownloader>,
    ) -> ModCacheResult<CacheOutcome> {
        let key = CacheKey::derive(spec, hostname)?;
        if let Some(module) = self.index.lookup(&key) {
            debug!("In-memory hit for {}", spec);
            return Ok(CacheOutcome::hit(module));
        }

        let root = std::path::absolute(root)
            .map_err(|e| ModCacheError::io(format!("resolving cache root {}", root.display()), e))?;

        loop {
            let _guard = match self.inflight.claim(&key) {
                Claim::Leader(guard) => guard,
                Claim::Follower(token) => {
                    debug!("Waiting for in-flight fetch of {}", spec);
                    token.wait();
                    continue;
                }
            };

            if let Some(module) = self.index.lookup(&key) {
                debug!("In-memory hit for {} after wait", spec);
                return Ok(CacheOutcome::hit(module));
            }

            if key.is_uuid() {
                if let Some(outcome) = self.get(&root, hostname, spec, &key)? {
                    return Ok(outcome);
                }
            }

            return self.put(
                &root,
                hostname,
                spec,
                &key,
                module_downloader,
                symfile_downloader,
            );
        }
    }

    /// Load a module already present in the UUID view
    fn get(
        &self,
        root: &Path,
        hostname: &str,
        spec: &ModuleSpec,
        key: &CacheKey,
    ) -> ModCacheResult<Option<CacheOutcome>> {
        let Some(uuid) = spec.uuid.clone() else {
            return Ok(None);
        };
        let uuid_path = layout::uuid_view_path(root, &spec.platform, key, filename(spec)?);
        if !store::exists(&uuid_path) {
            return Ok(None);
        }
        debug!("Disk hit for {} at {}", spec, uuid_path.display());

        let mut outcome = CacheOutcome::hit(Arc::new(Module::new(
            spec.clone(),
            uuid_path.clone(),
            uuid,
        )));

        let sysroot_path = layout::sysroot_view_path(root, &spec.platform, hostname, &spec.path);
        if fs::symlink_metadata(&sysroot_path).is_err() {
            if let Err(e) = store::link_sysroot(&sysroot_path, &uuid_path) {
                outcome.warnings.push(sysroot_warning(sysroot_path, e));
            }
        }
        self.attach_symbols(root, &outcome.module, None);

        self.index.insert(key.clone(), &outcome.module);
        Ok(Some(outcome))
    }

    /// Download a module and place it in both views
    fn put(
        &self,
        root: &Path,
        hostname: &str,
        spec: &ModuleSpec,
        key: &CacheKey,
        module_downloader: &dyn ModuleDownloader,
        symfile_downloader: Option<&dyn SymfileDownloader>,
    ) -> ModCacheResult<CacheOutcome> {
        let filename = filename(spec)?;
        let tmp = store::temp_file(&layout::temp_dir(root, &spec.platform))?;

        debug!("Downloading {} to {}", spec, tmp.path().display());
        module_downloader
            .download_module(spec, tmp.path())
            .map_err(|e| ModCacheError::download(spec.to_string(), e))?;

        let (final_key, uuid) = match &spec.uuid {
            Some(uuid) => (key.clone(), uuid.clone()),
            None => {
                let uuid = self
                    .probe
                    .probe(tmp.path())
                    .map_err(|e| ModCacheError::placement(tmp.path(), e))?;
                debug!("Resolved {} to UUID {}", spec, uuid);
                (CacheKey::for_uuid(&uuid, &spec.path), uuid)
            }
        };

        let uuid_path = layout::uuid_view_path(root, &spec.platform, &final_key, filename);
        match store::atomic_place(tmp, &uuid_path)? {
            Placement::Placed => info!("Cached {} at {}", spec, uuid_path.display()),
            Placement::AlreadyPresent => {
                debug!("Kept existing {} for {}", uuid_path.display(), spec)
            }
        }

        let mut warnings = Vec::new();
        let sysroot_path = layout::sysroot_view_path(root, &spec.platform, hostname, &spec.path);
        if let Err(e) = store::link_sysroot(&sysroot_path, &uuid_path) {
            warnings.push(sysroot_warning(sysroot_path, e));
        }

        let module = Arc::new(Module::new(spec.clone(), uuid_path, uuid));
        if let Some(warning) = self.attach_symbols(root, &module, symfile_downloader) {
            warnings.push(warning);
        }

        self.index.insert(key.clone(), &module);
        if final_key != *key {
            self.index.insert(final_key, &module);
        }

        Ok(CacheOutcome {
            module,
            created: true,
            warnings,
        })
    }

    /// Attach the module's symbol file, fetching it first if a downloader is given
    fn attach_symbols(
        &self,
        root: &Path,
        module: &Module,
        downloader: Option<&dyn SymfileDownloader>,
    ) -> Option<CacheWarning> {
        let sym_path = layout::symbol_file_path(module.file());
        if store::exists(&sym_path) {
            module.set_symbol_file(sym_path);
            return None;
        }
        let downloader = downloader?;

        let fetched = store::temp_file(&layout::temp_dir(root, &module.spec().platform))
            .map_err(|source| CacheWarning::SymbolPlacement { source })
            .and_then(|tmp| {
                downloader
                    .download_symfile(module, tmp.path())
                    .map_err(|source| CacheWarning::SymbolDownload {
                        module: module.spec().to_string(),
                        source,
                    })?;
                store::atomic_place(tmp, &sym_path)
                    .map_err(|source| CacheWarning::SymbolPlacement { source })
            });

        match fetched {
            Ok(_) => {
                debug!("Cached symbols at {}", sym_path.display());
                module.set_symbol_file(sym_path);
                None
            }
            Err(warning) => {
                warn!("{}", warning);
                Some(warning)
            }
        }
    }
}

fn filename(spec: &ModuleSpec) -> ModCacheResult<&str> {
    spec.filename()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ModCacheError::InvalidSpec(format!("no filename in {:?}", spec.path)))
}

fn sysroot_warning(path: std::path::PathBuf, source: std::io::Error) -> CacheWarning {
    let warning = CacheWarning::SysrootLink { path, source };
    warn!("{}", warning);
    warning
}
