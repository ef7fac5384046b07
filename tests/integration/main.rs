//! Integration tests for embedcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn embedcache() -> Command {
        cargo_bin_cmd!("embedcache")
    }

    #[test]
    fn help_displays() {
        embedcache()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("embedding cache"));
    }

    #[test]
    fn version_displays() {
        embedcache()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("embedcache"));
    }

    #[test]
    fn config_path() {
        embedcache()
            .args(["--no-local", "config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        embedcache()
            .args(["--no-local", "config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[store]"))
            .stdout(predicate::str::contains("embeddings.json"));
    }

    #[test]
    fn build_help() {
        embedcache()
            .args(["build", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--embed-command"))
            .stdout(predicate::str::contains("[producer] command"));
    }

    #[test]
    fn unknown_command_fails() {
        embedcache().arg("frobnicate").assert().failure();
    }
}

#[cfg(unix)]
mod build_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const COUNTING_PRODUCER: &str = "cat > /dev/null; echo x >> calls.log; echo '[0.1, 0.2]'";

    /// Project with two TypeScript files, one ignored file and a local config
    /// pointing the producer at `script`
    fn project(script: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/a.ts"), "export const a = 1;").unwrap();
        fs::write(root.join("src/b.tsx"), "export const B = () => null;").unwrap();
        fs::write(root.join("README.md"), "# readme").unwrap();
        fs::write(
            root.join(".embedcache.toml"),
            format!(
                "[producer]\ncommand = [\"sh\", \"-c\", {:?}]\n\n[secondary]\nenabled = false\n",
                script
            ),
        )
        .unwrap();
        temp
    }

    fn embedcache(root: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("embedcache");
        cmd.current_dir(root)
            .env("EMBEDCACHE_CONFIG", root.join("global-none.toml"))
            .env_remove("RUST_LOG");
        cmd
    }

    fn producer_calls(root: &Path) -> usize {
        fs::read_to_string(root.join("calls.log"))
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }

    fn stored(root: &Path) -> serde_json::Value {
        let content = fs::read_to_string(root.join("embeddings.json")).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    #[test]
    fn build_writes_store() {
        let temp = project(COUNTING_PRODUCER);
        let root = temp.path();

        embedcache(root)
            .arg("build")
            .assert()
            .success()
            .stdout(predicate::str::contains("2 generated"));

        assert_eq!(producer_calls(root), 2);
        assert_eq!(
            stored(root),
            serde_json::json!({
                "src/a.ts": [0.1, 0.2],
                "src/b.tsx": [0.1, 0.2],
            })
        );
    }

    #[test]
    fn second_build_reuses_store() {
        let temp = project(COUNTING_PRODUCER);
        let root = temp.path();

        embedcache(root).arg("build").assert().success();
        let first = fs::read_to_string(root.join("embeddings.json")).unwrap();

        embedcache(root)
            .arg("build")
            .assert()
            .success()
            .stdout(predicate::str::contains("2 stored"));

        assert_eq!(producer_calls(root), 2);
        assert_eq!(
            fs::read_to_string(root.join("embeddings.json")).unwrap(),
            first
        );
    }

    #[test]
    fn new_file_is_added_without_recomputing() {
        let temp = project(COUNTING_PRODUCER);
        let root = temp.path();

        embedcache(root).arg("build").assert().success();
        fs::write(root.join("src/c.ts"), "export const c = 3;").unwrap();
        embedcache(root).arg("build").assert().success();

        assert_eq!(producer_calls(root), 3);
        assert_eq!(stored(root).as_object().unwrap().len(), 3);
    }

    #[test]
    fn no_staging_files_left_behind() {
        let temp = project(COUNTING_PRODUCER);
        let root = temp.path();

        embedcache(root).arg("build").assert().success();

        let leftovers: Vec<_> = fs::read_dir(root)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn failing_producer_reports_and_keeps_store() {
        let temp = project("cat > /dev/null; echo nope >&2; exit 1");
        let root = temp.path();
        fs::write(root.join("embeddings.json"), "{\"src/a.ts\": [1.0]}").unwrap();

        embedcache(root)
            .arg("build")
            .assert()
            .failure()
            .stderr(predicate::str::contains("1 of 2 resources failed"));

        // Only the stored entry remains; nothing new was published
        assert_eq!(stored(root), serde_json::json!({ "src/a.ts": [1.0] }));
    }

    #[test]
    fn partial_failure_persists_successes() {
        let temp = project(
            "cat > /dev/null; \
             if [ \"$EMBEDCACHE_IDENTIFIER\" = src/b.tsx ]; then echo nope >&2; exit 1; fi; \
             echo '[0.5]'",
        );
        let root = temp.path();

        embedcache(root)
            .arg("build")
            .assert()
            .failure()
            .stdout(predicate::str::contains("src/b.tsx"))
            .stderr(predicate::str::contains("1 of 2 resources failed"));

        assert_eq!(stored(root), serde_json::json!({ "src/a.ts": [0.5] }));
    }

    #[test]
    fn corrupt_store_is_rebuilt() {
        let temp = project(COUNTING_PRODUCER);
        let root = temp.path();
        fs::write(root.join("embeddings.json"), "{ not json").unwrap();

        embedcache(root).arg("build").assert().success();

        assert_eq!(producer_calls(root), 2);
        assert_eq!(stored(root).as_object().unwrap().len(), 2);
    }

    #[test]
    fn missing_producer_is_reported() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.ts"), "x").unwrap();

        embedcache(temp.path())
            .args(["build", "--no-secondary"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No producer command configured"));
    }

    #[test]
    fn list_json_reports_dimensions() {
        let temp = project(COUNTING_PRODUCER);
        let root = temp.path();

        embedcache(root).arg("build").assert().success();

        let output = embedcache(root)
            .args(["list", "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(
            entries,
            serde_json::json!([
                { "identifier": "src/a.ts", "dimensions": 2 },
                { "identifier": "src/b.tsx", "dimensions": 2 },
            ])
        );
    }

    #[test]
    fn list_empty_store() {
        let temp = TempDir::new().unwrap();

        embedcache(temp.path())
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("No stored embeddings"));
    }

    #[test]
    fn prune_removes_deleted_files() {
        let temp = project(COUNTING_PRODUCER);
        let root = temp.path();

        embedcache(root).arg("build").assert().success();
        fs::remove_file(root.join("src/b.tsx")).unwrap();

        embedcache(root)
            .args(["prune", "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Would remove src/b.tsx"));
        assert_eq!(stored(root).as_object().unwrap().len(), 2);

        embedcache(root)
            .arg("prune")
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed src/b.tsx"));
        assert_eq!(stored(root), serde_json::json!({ "src/a.ts": [0.1, 0.2] }));
    }
}
