//! Resolution of module arguments against configuration

use crate::cache::key::CacheKey;
use crate::cache::layout;
use crate::cli::args::ModuleArgs;
use crate::config::Config;
use crate::error::{ModCacheError, ModCacheResult};
use crate::module::{ModuleSpec, ModuleUuid};
use std::path::PathBuf;

/// A module request with every setting resolved
#[derive(Debug, Clone)]
pub(crate) struct Target {
    pub spec: ModuleSpec,
    pub root: PathBuf,
    pub hostname: String,
}

impl Target {
    /// Combine command-line arguments with config defaults
    pub fn resolve(args: &ModuleArgs, config: &Config) -> ModCacheResult<Self> {
        let platform = args
            .platform
            .clone()
            .unwrap_or_else(|| config.cache.platform.clone());
        let mut spec = ModuleSpec::new(args.path.clone(), platform);
        if let Some(uuid) = &args.uuid {
            spec = spec.with_uuid(uuid.parse::<ModuleUuid>()?);
        }
        if let Some(arch) = &args.arch {
            spec = spec.with_arch(arch.clone());
        }
        spec.validate()?;

        // Same resolution as ModuleCache::get_and_put
        let root = args.root.as_ref().unwrap_or(&config.cache.root);
        let root = std::path::absolute(root).map_err(|e| {
            ModCacheError::io(format!("resolving cache root {}", root.display()), e)
        })?;

        Ok(Self {
            spec,
            root,
            hostname: args
                .hostname
                .clone()
                .unwrap_or_else(|| config.cache.hostname.clone()),
        })
    }

    /// UUID view of the module, if its UUID is known up front
    pub fn uuid_view(&self) -> ModCacheResult<Option<PathBuf>> {
        let key = CacheKey::derive(&self.spec, &self.hostname)?;
        if !key.is_uuid() {
            return Ok(None);
        }
        let filename = self.spec.filename().unwrap_or_default();
        Ok(Some(layout::uuid_view_path(
            &self.root,
            &self.spec.platform,
            &key,
            filename,
        )))
    }

    pub fn sysroot_view(&self) -> PathBuf {
        layout::sysroot_view_path(
            &self.root,
            &self.spec.platform,
            &self.hostname,
            &self.spec.path,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::OutputFormat;

    fn args(uuid: Option<&str>) -> ModuleArgs {
        ModuleArgs {
            path: PathBuf::from("/lib/x86_64-linux-gnu/libc.so.6"),
            uuid: uuid.map(str::to_string),
            arch: None,
            platform: Some("remote-linux".to_string()),
            hostname: None,
            root: Some(PathBuf::from("/tmp/lldb")),
            format: OutputFormat::Text,
        }
    }

    #[test]
    fn hostname_falls_back_to_config() {
        let mut config = Config::default();
        config.cache.hostname = "ubuntu".to_string();

        let target = Target::resolve(&args(None), &config).unwrap();

        assert_eq!(target.hostname, "ubuntu");
        assert_eq!(
            target.sysroot_view(),
            PathBuf::from("/tmp/lldb/remote-linux/ubuntu/lib/x86_64-linux-gnu/libc.so.6")
        );
    }

    #[test]
    fn uuid_view_needs_uuid() {
        let config = Config::default();
        let without = Target::resolve(&args(None), &config).unwrap();
        assert_eq!(without.uuid_view().unwrap(), None);

        let with = Target::resolve(
            &args(Some("30C94DC6-6A1F-E951-80C3-D68D2B89E576")),
            &config,
        )
        .unwrap();
        let view = with.uuid_view().unwrap().unwrap();
        assert!(view.starts_with("/tmp/lldb/remote-linux/.cache"));
        assert!(view.ends_with("libc.so.6"));
    }

    #[test]
    fn relative_root_is_made_absolute() {
        let config = Config::default();
        let mut relative = args(None);
        relative.root = Some(PathBuf::from("cache-root"));
        relative.arch = Some("aarch64".to_string());

        let target = Target::resolve(&relative, &config).unwrap();

        let expected = std::env::current_dir().unwrap().join("cache-root");
        assert_eq!(target.root, expected);
        assert!(target.sysroot_view().starts_with(&expected));
        assert_eq!(target.spec.arch.as_deref(), Some("aarch64"));
    }

    #[test]
    fn malformed_uuid_rejected() {
        let config = Config::default();
        assert!(Target::resolve(&args(Some("not-a-uuid")), &config).is_err());
    }
}
