//! On-disk layout of the module cache
//!
//! Each cached module has two views:
//!
//! - UUID view:    `<root>/<platform>/.cache/<uuid>-<disambiguator>/<filename>`
//! - Sysroot view: `<root>/<platform>/<hostname>/<full target path>`
//!
//! The UUID view holds the module bytes; the sysroot view is a symlink to it.
//! Everything here is a pure path computation.

use crate::cache::key::CacheKey;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Directory holding the UUID views of one platform
pub const UUID_VIEW_DIR: &str = ".cache";

/// Suffix of the symbol artifact stored next to a module
pub const SYMBOL_FILE_SUFFIX: &str = ".sym";

/// Characters that may not appear in a single path component
const COMPONENT_ESCAPES: &AsciiSet = &CONTROLS
    .add(b'/')
    .add(b'\\')
    .add(b':')
    .add(b'*')
    .add(b'?')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'|')
    .add(b'%');

/// Percent-escape a hostname, platform or filename for use as one component.
///
/// The escaping is one-way; cached names are never decoded.
pub fn escape_component(name: &str) -> String {
    let escaped = utf8_percent_encode(name, COMPONENT_ESCAPES).to_string();
    match escaped.as_str() {
        "" => "%00".to_string(),
        "." | ".." => escaped.replace('.', "%2E"),
        _ => escaped,
    }
}

/// Escape a hostname for use as the top directory of a sysroot view.
///
/// A leading `.` is always escaped, so no host directory can share a name
/// with [`UUID_VIEW_DIR`] or any other dot-directory of the platform.
pub fn escape_hostname(hostname: &str) -> String {
    let escaped = escape_component(hostname);
    match escaped.strip_prefix('.') {
        Some(rest) => format!("%2E{}", rest),
        None => escaped,
    }
}

/// Root of one platform inside the cache
pub fn platform_dir(root: &Path, platform: &str) -> PathBuf {
    root.join(escape_component(platform))
}

/// Canonical, content-bearing location of a module
pub fn uuid_view_path(root: &Path, platform: &str, key: &CacheKey, filename: &str) -> PathBuf {
    platform_dir(root, platform)
        .join(UUID_VIEW_DIR)
        .join(key.dir_name())
        .join(escape_component(filename))
}

/// Mirror of the target's directory structure for one host
pub fn sysroot_view_path(root: &Path, platform: &str, hostname: &str, full_path: &Path) -> PathBuf {
    let mut path = platform_dir(root, platform).join(escape_hostname(hostname));
    for component in full_path.components() {
        if let Component::Normal(part) = component {
            path.push(part);
        }
    }
    path
}

/// Location of the debug-symbol artifact for a UUID-view file
pub fn symbol_file_path(uuid_view: &Path) -> PathBuf {
    let mut name: OsString = uuid_view.file_name().unwrap_or_default().to_os_string();
    name.push(SYMBOL_FILE_SUFFIX);
    uuid_view.with_file_name(name)
}

/// Directory for in-flight downloads; on the same filesystem as the UUID views
pub fn temp_dir(root: &Path, platform: &str) -> PathBuf {
    platform_dir(root, platform).join(UUID_VIEW_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleSpec;

    const LIBC: &str = "/lib/x86_64-linux-gnu/libc.so.6";
    const LIBC_UUID: &str = "30C94DC6-6A1F-E951-80C3-D68D2B89E576";

    fn libc_key() -> CacheKey {
        let spec = ModuleSpec::new(LIBC, "remote-linux").with_uuid(LIBC_UUID.parse().unwrap());
        CacheKey::derive(&spec, "ubuntu").unwrap()
    }

    #[test]
    fn uuid_view_matches_layout() {
        let key = libc_key();
        let path = uuid_view_path(Path::new("/tmp/lldb"), "remote-linux", &key, "libc.so.6");
        let expected = PathBuf::from("/tmp/lldb/remote-linux/.cache")
            .join(key.dir_name())
            .join("libc.so.6");
        assert_eq!(path, expected);
        assert!(key.dir_name().starts_with(&format!("{}-", LIBC_UUID)));
    }

    #[test]
    fn sysroot_view_strips_leading_separator() {
        let path = sysroot_view_path(
            Path::new("/tmp/lldb"),
            "remote-linux",
            "ubuntu",
            Path::new(LIBC),
        );
        assert_eq!(
            path,
            PathBuf::from("/tmp/lldb/remote-linux/ubuntu/lib/x86_64-linux-gnu/libc.so.6")
        );
    }

    #[test]
    fn paths_are_deterministic() {
        let root = Path::new("/cache");
        let a = uuid_view_path(root, "remote-linux", &libc_key(), "libc.so.6");
        let b = uuid_view_path(root, "remote-linux", &libc_key(), "libc.so.6");
        assert_eq!(a, b);
    }

    #[test]
    fn hostname_is_escaped() {
        let path = sysroot_view_path(
            Path::new("/cache"),
            "remote-linux",
            "10.0.0.1:1234",
            Path::new("/lib/libc.so.6"),
        );
        assert_eq!(
            path,
            PathBuf::from("/cache/remote-linux/10.0.0.1%3A1234/lib/libc.so.6")
        );
    }

    #[test]
    fn dot_hostnames_stay_out_of_uuid_views() {
        assert_eq!(escape_hostname(".cache"), "%2Ecache");
        assert_eq!(escape_hostname(".hidden"), "%2Ehidden");
        assert_eq!(escape_hostname(".."), "%2E%2E");
        assert_eq!(escape_hostname("host.local"), "host.local");

        let root = Path::new("/cache");
        let sysroot = sysroot_view_path(root, "remote-linux", ".cache", Path::new("/lib/libc.so.6"));
        assert!(!sysroot.starts_with(temp_dir(root, "remote-linux")));
        assert_eq!(
            sysroot,
            PathBuf::from("/cache/remote-linux/%2Ecache/lib/libc.so.6")
        );
    }

    #[test]
    fn escape_component_handles_specials() {
        assert_eq!(escape_component("plain-name_1.so"), "plain-name_1.so");
        assert_eq!(escape_component("a/b"), "a%2Fb");
        assert_eq!(escape_component("100%"), "100%25");
        assert_eq!(escape_component(".."), "%2E%2E");
        assert_eq!(escape_component(""), "%00");
    }

    #[test]
    fn symbol_file_next_to_module() {
        let sym = symbol_file_path(Path::new("/cache/x/.cache/K/libc.so.6"));
        assert_eq!(sym, PathBuf::from("/cache/x/.cache/K/libc.so.6.sym"));
    }

    #[test]
    fn temp_dir_shares_uuid_view_parent() {
        let tmp = temp_dir(Path::new("/cache"), "remote-linux");
        let view = uuid_view_path(Path::new("/cache"), "remote-linux", &libc_key(), "libc.so.6");
        assert!(view.starts_with(&tmp));
    }
}
