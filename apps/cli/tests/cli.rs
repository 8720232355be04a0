//! CLI validation behavior: every configuration failure must name the
//! offending flag, exit with status 1, and never touch the network.

use assert_cmd::Command;
use predicates::prelude::*;

fn kvmount() -> Command {
    Command::cargo_bin("kvmount").unwrap()
}

fn valid_args(dir: &str) -> Vec<String> {
    [
        "--vaultName", "myvault",
        "--vaultObjectNames", "a",
        "--vaultObjectTypes", "secret",
        "--resourceGroup", "rg",
        "--subscriptionId", "sub",
        "--tenantId", "tenant",
        "--aADClientID", "app",
        "--aADClientSecret", "hush",
        "--dir", dir,
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

#[test]
fn missing_required_flag_exits_one_and_names_it() {
    kvmount()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--vaultName is not set"));
}

#[test]
fn unknown_object_type_fails_before_any_network_call() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = valid_args(dir.path().to_str().unwrap());
    let types = args.iter().position(|a| a == "secret").unwrap();
    args[types] = "floppy".to_string();

    kvmount()
        .args(&args)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid object type 'floppy'"));
}

#[test]
fn alias_count_mismatch_names_the_alias_flag() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = valid_args(dir.path().to_str().unwrap());
    args.extend(["--vaultObjectAliases".to_string(), "x;y".to_string()]);

    kvmount()
        .args(&args)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("vaultObjectAliases"));
}

#[test]
fn pod_identity_mode_requires_pod_name() {
    let dir = tempfile::tempdir().unwrap();
    kvmount()
        .args([
            "--vaultName", "myvault",
            "--vaultObjectNames", "a",
            "--vaultObjectTypes", "secret",
            "--resourceGroup", "rg",
            "--subscriptionId", "sub",
            "--usePodIdentity",
            "--dir", dir.path().to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--podName is not set"));
}

#[test]
fn mixing_identity_modes_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = valid_args(dir.path().to_str().unwrap());
    args.extend([
        "--usePodIdentity".to_string(),
        "--podName".to_string(),
        "nginx-0".to_string(),
        "--podNamespace".to_string(),
        "default".to_string(),
    ]);

    kvmount()
        .args(&args)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--usePodIdentity conflicts"));
}

#[test]
fn missing_target_directory_is_reported_before_network() {
    let args = valid_args("/nonexistent/kvmount-test-dir");
    kvmount()
        .args(&args)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to get directory"));
}

#[test]
fn version_flag_prints_the_banner() {
    let mut args = valid_args("/nonexistent/kvmount-test-dir");
    args.push("--version".to_string());

    // The banner appears even though the run then fails on the directory.
    kvmount()
        .args(&args)
        .assert()
        .failure()
        .stdout(predicate::str::contains("kvmount"));
}
