#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Scratch dir with stand-in `mysqldump`/`mysql` scripts and a deployments file.
struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        std::fs::create_dir(&bin).unwrap();

        write_script(
            &bin.join("mysqldump"),
            "#!/bin/sh\nprintf \"INSERT INTO options VALUES ('siteurl','http://dev.local');\\n\"\n",
        );
        write_script(&bin.join("mysql"), "#!/bin/sh\ncat > /dev/null\n");

        let config = format!(
            r#"
options:
  target: qa
  backups_dir: {}
local:
  url: http://dev.local
  host: localhost
  user: root
  database: devdb
qa:
  url: http://qa.example.com
  host: localhost
  user: root
  database: qadb
"#,
            dir.path().join("backups").display()
        );
        std::fs::write(dir.path().join("deployments.yaml"), config).unwrap();

        Self { dir }
    }

    fn config(&self) -> PathBuf {
        self.dir.path().join("deployments.yaml")
    }

    fn dbsync(&self, args: &[&str]) -> Output {
        let path = format!(
            "{}:{}",
            self.dir.path().join("bin").display(),
            std::env::var("PATH").unwrap_or_default()
        );
        Command::new(env!("CARGO_BIN_EXE_dbsync"))
            .args(args)
            .arg("--config")
            .arg(self.config())
            .env("PATH", path)
            .env_remove("DBSYNC_CONFIG")
            .output()
            .unwrap()
    }
}

fn write_script(path: &Path, body: &str) {
    std::fs::write(path, body).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn json_report_is_the_only_thing_on_stdout() {
    let ws = Workspace::new();
    let out = ws.dbsync(&["push", "--target", "qa", "--json"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout)
        .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {}", String::from_utf8_lossy(&out.stdout)));
    assert_eq!(report["direction"], "push");
    assert_eq!(report["destination"], "qa");
    assert_eq!(report["replacements"], 1);

    // Logs still go somewhere.
    assert!(String::from_utf8_lossy(&out.stderr).contains("Operations completed"));

    let imported = std::fs::read_to_string(report["source_dump"].as_str().unwrap()).unwrap();
    assert!(imported.contains("http://qa.example.com"));
}

#[test]
fn blank_target_uses_configured_default() {
    let ws = Workspace::new();
    let out = ws.dbsync(&["pull", "--target", "", "--dry-run"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let plan = String::from_utf8_lossy(&out.stdout);
    assert!(plan.starts_with("Plan: pull 'qa' -> 'Local'"), "{plan}");
}

#[test]
fn unknown_target_exits_non_zero() {
    let ws = Workspace::new();
    let out = ws.dbsync(&["push", "--target", "nowhere"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Invalid target 'nowhere'"));
    assert!(!ws.dir.path().join("backups").exists());
}

#[test]
fn validate_reports_bad_default_target() {
    let ws = Workspace::new();
    let content = std::fs::read_to_string(ws.config())
        .unwrap()
        .replace("target: qa", "target: staging");
    std::fs::write(ws.config(), content).unwrap();

    let out = ws.dbsync(&["validate"]);
    assert!(!out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Default target 'staging': NOT FOUND"), "{stdout}");
    assert!(stdout.contains("Validation FAILED with 1 error(s)"), "{stdout}");
}
