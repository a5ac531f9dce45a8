//! Binary-level tests for the `iterlint` command.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const BUILDS_NAMES: &str = "const names = [];
employees.forEach(employee => {
  names.push(employee.name);
});
";

const CLEAN: &str = "const names = employees.map(employee => employee.name);
";

/// A command isolated from any user-wide configuration.
fn iterlint(global_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("iterlint").unwrap();
    cmd.env("ITERLINT_CONFIG_DIR", global_dir);
    cmd
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    dir
}

#[test]
fn reports_findings_and_fails() {
    let dir = project(&[("app.js", BUILDS_NAMES)]);
    let global = TempDir::new().unwrap();
    iterlint(global.path())
        .args(["lint"])
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("IT003 ForEachBuildingCollection at app.js:2:11"))
        .stdout(predicate::str::contains("= help: use map"));
}

#[test]
fn clean_project_passes() {
    let dir = project(&[("app.js", CLEAN)]);
    let global = TempDir::new().unwrap();
    iterlint(global.path())
        .arg("lint")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0 warning(s)"));
}

#[test]
fn disabled_category_passes() {
    let dir = project(&[("app.js", BUILDS_NAMES)]);
    let global = TempDir::new().unwrap();
    iterlint(global.path())
        .arg("lint")
        .arg(dir.path())
        .args(["--disable", "for-each-building-collection,IT002"])
        .assert()
        .success();
}

#[test]
fn severity_threshold_controls_exit_code() {
    let dir = project(&[("app.js", BUILDS_NAMES)]);
    let global = TempDir::new().unwrap();
    iterlint(global.path())
        .arg("lint")
        .arg(dir.path())
        .args(["--severity", "error", "--format", "compact"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "app.js:2:11: warning [IT003] `names` is built by forEach(); use map() instead (suggested: map)",
        ));
}

#[test]
fn json_output() {
    let dir = project(&[
        ("src/app.js", BUILDS_NAMES),
        ("src/lib.rs", "fn f() { xs.iter().map(save); }\n"),
    ]);
    let global = TempDir::new().unwrap();
    let output = iterlint(global.path())
        .arg("lint")
        .arg(dir.path())
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["files_checked"], 2);
    let findings = json["findings"].as_array().unwrap();
    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0]["file"], "src/app.js");
    assert_eq!(findings[0]["line"], 2);
    assert_eq!(findings[0]["category"], "ForEachBuildingCollection");
    assert_eq!(findings[0]["construct"], "forEach");
    assert_eq!(findings[0]["suggestedFix"], "map");
    assert_eq!(findings[1]["file"], "src/lib.rs");
    assert_eq!(findings[1]["suggestedFix"], "for_each");
}

#[test]
fn project_config_is_applied() {
    let dir = project(&[
        ("app.js", BUILDS_NAMES),
        (
            "iterlint.toml",
            "preset = \"strict\"\nfail_on = \"error\"\n[rules.IT003]\nseverity = \"info\"\n",
        ),
    ]);
    let global = TempDir::new().unwrap();
    iterlint(global.path())
        .arg("lint")
        .arg(dir.path())
        .args(["--format", "compact"])
        .assert()
        .success()
        .stdout(predicate::str::contains("info [IT003]"));
}

#[test]
fn invalid_config_is_fatal() {
    let dir = project(&[
        ("app.js", CLEAN),
        ("iterlint.toml", "[rules.NoSuchThing]\nenabled = false\n"),
    ]);
    let global = TempDir::new().unwrap();
    iterlint(global.path())
        .arg("lint")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown category `NoSuchThing`"));
}

#[test]
fn unknown_disable_value_is_rejected() {
    let global = TempDir::new().unwrap();
    iterlint(global.path())
        .args(["lint", ".", "--disable", "bogus"])
        .assert()
        .code(2);
}

#[test]
fn syntax_errors_do_not_stop_the_run() {
    let dir = project(&[("a.js", "employees.forEach(e => {\n"), ("b.js", BUILDS_NAMES)]);
    let global = TempDir::new().unwrap();
    iterlint(global.path())
        .arg("lint")
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("a.js: javascript parse error"))
        .stdout(predicate::str::contains("IT003"));
}

#[test]
fn list_rules_shows_every_category() {
    let global = TempDir::new().unwrap();
    let output = iterlint(global.path()).arg("list-rules").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for code in ["IT001", "IT002", "IT003", "IT004", "IT005"] {
        assert!(stdout.contains(code), "{code} missing from:\n{stdout}");
    }
}

#[test]
fn init_writes_config_once() {
    let dir = TempDir::new().unwrap();
    let global = TempDir::new().unwrap();
    iterlint(global.path())
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();
    assert!(dir.path().join("iterlint.toml").is_file());

    iterlint(global.path())
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    iterlint(global.path())
        .current_dir(dir.path())
        .args(["init", "--force"])
        .assert()
        .success();
}
