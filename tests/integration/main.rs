//! Integration tests for modcache

const LIBC: &str = "/lib/x86_64-linux-gnu/libc.so.6";
const LIBC_UUID: &str = "30C94DC6-6A1F-E951-80C3-D68D2B89E576";

mod cli_tests {
    use super::{LIBC, LIBC_UUID};
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Command isolated from the user's config and environment
    fn modcache(home: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("modcache");
        cmd.env_remove("MODCACHE_ROOT")
            .env_remove("MODCACHE_HOSTNAME")
            .env("MODCACHE_CONFIG", home.join("config.toml"));
        cmd
    }

    fn mirror() -> TempDir {
        let dir = TempDir::new().unwrap();
        let module = dir.path().join("lib/x86_64-linux-gnu/libc.so.6");
        fs::create_dir_all(module.parent().unwrap()).unwrap();
        fs::write(&module, b"\x7fELF libc").unwrap();
        let debug = dir
            .path()
            .join("usr/lib/debug/lib/x86_64-linux-gnu/libc.so.6.debug");
        fs::create_dir_all(debug.parent().unwrap()).unwrap();
        fs::write(&debug, b"dwarf").unwrap();
        dir
    }

    #[test]
    fn help_displays() {
        let home = TempDir::new().unwrap();
        modcache(home.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("remote debug-target modules"));
    }

    #[test]
    fn version_displays() {
        let home = TempDir::new().unwrap();
        modcache(home.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("modcache"));
    }

    #[test]
    fn paths_show_both_views() {
        let home = TempDir::new().unwrap();
        modcache(home.path())
            .args([
                "paths", LIBC, "--uuid", LIBC_UUID, "--platform", "remote-linux",
                "--hostname", "ubuntu", "--root", "/tmp/lldb",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(format!(
                "/tmp/lldb/remote-linux/.cache/{}-",
                LIBC_UUID
            )))
            .stdout(predicate::str::contains(
                "/tmp/lldb/remote-linux/ubuntu/lib/x86_64-linux-gnu/libc.so.6",
            ));
    }

    #[test]
    fn paths_json_without_uuid() {
        let home = TempDir::new().unwrap();
        let output = modcache(home.path())
            .args([
                "paths", LIBC, "--platform", "remote-linux", "--hostname", "ubuntu",
                "--root", "/tmp/lldb", "--format", "json",
            ])
            .output()
            .unwrap();
        assert!(output.status.success());

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert!(json["uuid_view"].is_null());
        assert_eq!(
            json["sysroot_view"],
            "/tmp/lldb/remote-linux/ubuntu/lib/x86_64-linux-gnu/libc.so.6"
        );
    }

    #[test]
    fn fetch_then_cached() {
        let home = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let mirror = mirror();
        let args = [
            "fetch",
            LIBC,
            "--uuid",
            LIBC_UUID,
            "--platform",
            "remote-linux",
            "--hostname",
            "ubuntu",
            "--root",
            root.path().to_str().unwrap(),
            "--mirror",
            mirror.path().to_str().unwrap(),
        ];

        modcache(home.path())
            .args(args)
            .assert()
            .success()
            .stdout(predicate::str::contains("fetched"))
            .stdout(predicate::str::contains("symbols:"));

        modcache(home.path())
            .args(args)
            .assert()
            .success()
            .stdout(predicate::str::contains("cached"));

        let link = root
            .path()
            .join("remote-linux/ubuntu/lib/x86_64-linux-gnu/libc.so.6");
        assert_eq!(fs::read(link).unwrap(), b"\x7fELF libc");
    }

    #[test]
    fn fetch_json_reports_created() {
        let home = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let mirror = mirror();

        let output = modcache(home.path())
            .args([
                "fetch",
                LIBC,
                "--no-symbols",
                "--format",
                "json",
                "--root",
                root.path().to_str().unwrap(),
                "--mirror",
                mirror.path().to_str().unwrap(),
            ])
            .output()
            .unwrap();
        assert!(output.status.success());

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["created"], true);
        assert!(json["symbol_file"].is_null());
        assert!(json["warnings"].as_array().unwrap().is_empty());
    }

    #[test]
    fn fetch_without_mirrors_fails() {
        let home = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        modcache(home.path())
            .args(["fetch", LIBC, "--root", root.path().to_str().unwrap()])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No mirrors configured"));
    }

    #[test]
    fn fetch_missing_module_fails() {
        let home = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let mirror = TempDir::new().unwrap();
        modcache(home.path())
            .args([
                "fetch",
                "/lib/libmissing.so",
                "--root",
                root.path().to_str().unwrap(),
                "--mirror",
                mirror.path().to_str().unwrap(),
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Download failed"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn malformed_uuid_fails() {
        let home = TempDir::new().unwrap();
        modcache(home.path())
            .args(["paths", LIBC, "--uuid", "xyz"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid module spec"));
    }

    #[test]
    fn config_path_and_init() {
        let home = TempDir::new().unwrap();
        modcache(home.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));

        modcache(home.path())
            .args(["config", "init"])
            .assert()
            .success();
        assert!(home.path().join("config.toml").exists());

        modcache(home.path())
            .args(["config", "set", "cache.hostname", "ubuntu"])
            .assert()
            .success();
        modcache(home.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("hostname = \"ubuntu\""));
    }
}

mod library_tests {
    use super::{LIBC, LIBC_UUID};
    use modcache::cache::{MirrorDownloader, ModuleCache, SymfileDownloader};
    use modcache::ModuleSpec;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn mirror_fetch_end_to_end() {
        let mirror = TempDir::new().unwrap();
        let module = mirror.path().join("lib/x86_64-linux-gnu/libc.so.6");
        fs::create_dir_all(module.parent().unwrap()).unwrap();
        fs::write(&module, b"libc").unwrap();

        let mut downloader = MirrorDownloader::new();
        downloader.add_mirror(mirror.path());

        let root = TempDir::new().unwrap();
        let spec = ModuleSpec::new(LIBC, "remote-linux").with_uuid(LIBC_UUID.parse().unwrap());
        let cache = ModuleCache::new();

        // No debug tree in the mirror: symbols fail softly
        let outcome = cache
            .get_and_put(
                root.path(),
                "ubuntu",
                &spec,
                &downloader,
                Some(&downloader as &dyn SymfileDownloader),
            )
            .unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(fs::read(outcome.module.file()).unwrap(), b"libc");
        assert_eq!(cache.loaded_count(), 1);
    }
}
