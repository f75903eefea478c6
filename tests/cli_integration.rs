//! Integration tests for the secvault CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Opening a vault runs the full scrypt derivation, so the tests stick to
//! paths that never derive a key (help, version, completions, the audit
//! log, argument errors).

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

/// Helper: get a Command pointing at the secvault binary, isolated from
/// the user's real config directory.
fn secvault(config_dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("secvault").expect("binary should exist");
    cmd.env("SECVAULT_DIR", config_dir.path());
    cmd
}

#[test]
fn help_flag_shows_usage() {
    let tmp = TempDir::new().unwrap();
    secvault(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Local encrypted secrets vault"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("set"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("backup"));
}

#[test]
fn version_flag_shows_version() {
    let tmp = TempDir::new().unwrap();
    secvault(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("secvault"));
}

#[test]
fn no_args_shows_help() {
    let tmp = TempDir::new().unwrap();
    secvault(&tmp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn get_requires_service_and_field() {
    let tmp = TempDir::new().unwrap();
    secvault(&tmp).args(["get", "github"]).assert().failure();
}

#[test]
fn import_help_mentions_overwrite() {
    let tmp = TempDir::new().unwrap();
    secvault(&tmp)
        .args(["import", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--overwrite"))
        .stdout(predicate::str::contains("services"));
}

#[test]
fn completions_for_bash() {
    let tmp = TempDir::new().unwrap();
    secvault(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("secvault"));
}

#[test]
fn completions_reject_unknown_shell() {
    let tmp = TempDir::new().unwrap();
    secvault(&tmp)
        .args(["completions", "tcsh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn completions_do_not_create_credentials() {
    let tmp = TempDir::new().unwrap();
    secvault(&tmp).args(["completions", "zsh"]).assert().success();

    tmp.child("salt.bin").assert(predicate::path::missing());
    tmp.child("secret_password.bin")
        .assert(predicate::path::missing());
}

#[test]
fn malformed_config_file_is_reported() {
    let tmp = TempDir::new().unwrap();
    tmp.child("secvault.toml")
        .write_str("store = [not toml")
        .unwrap();

    secvault(&tmp)
        .args(["audit"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("secvault.toml"));
}

#[cfg(feature = "audit-log")]
#[test]
fn audit_on_fresh_config_dir_is_empty() {
    let tmp = TempDir::new().unwrap();
    secvault(&tmp)
        .args(["audit", "--last", "5"])
        .assert()
        .success();

    tmp.child("salt.bin").assert(predicate::path::missing());
}

#[cfg(feature = "audit-log")]
#[test]
fn audit_rejects_bad_since() {
    let tmp = TempDir::new().unwrap();
    secvault(&tmp)
        .args(["audit", "--since", "yesterday"])
        .assert()
        .failure();
}

#[cfg(not(windows))]
#[test]
fn env_store_is_refused_instead_of_losing_writes() {
    let tmp = TempDir::new().unwrap();
    tmp.child("secvault.toml").write_str("store = \"env\"\n").unwrap();

    secvault(&tmp)
        .args(["set", "github", "token", "abc123"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("added").not())
        .stderr(predicate::str::contains("env"));

    // A second process sees the same refusal, not an empty vault.
    secvault(&tmp)
        .args(["get", "github", "token"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("env"));

    // Refused before key derivation: no credential files were created.
    tmp.child("salt.bin").assert(predicate::path::missing());
    tmp.child("secret_password.bin")
        .assert(predicate::path::missing());
}

#[cfg(windows)]
#[test]
#[ignore = "derives the full-cost key and writes HKCU\\Environment"]
fn env_store_persists_across_processes() {
    let tmp = TempDir::new().unwrap();
    let entry = format!("SECVAULT_CLI_TEST_{}", std::process::id());
    tmp.child("secvault.toml")
        .write_str(&format!("store = \"env\"\nentry_name = \"{entry}\"\n"))
        .unwrap();

    secvault(&tmp)
        .args(["set", "github", "token", "abc123"])
        .assert()
        .success();

    secvault(&tmp)
        .args(["get", "github", "token"])
        .assert()
        .success()
        .stdout(predicate::str::contains("abc123"));

    let _ = winreg::RegKey::predef(winreg::enums::HKEY_CURRENT_USER)
        .open_subkey_with_flags("Environment", winreg::enums::KEY_WRITE)
        .and_then(|key| key.delete_value(&entry));
}
