use assert_cmd::Command;
use predicates::prelude::*;

fn datascope() -> Command {
    Command::cargo_bin("datascope").unwrap()
}

#[test]
fn test_help_lists_commands() {
    datascope()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("capabilities"))
        .stdout(predicate::str::contains("containers"))
        .stdout(predicate::str::contains("query"))
        .stdout(predicate::str::contains("browse"));
}

#[test]
fn test_version_flag() {
    datascope()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("datascope"));
}

#[test]
fn test_no_service_selected_is_an_error() {
    let temp = tempfile::TempDir::new().unwrap();
    let config = temp.path().join("config.toml");

    datascope()
        .args(["--config", config.to_str().unwrap(), "containers"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no service selected"));
}

#[test]
fn test_unknown_named_service_is_an_error() {
    let temp = tempfile::TempDir::new().unwrap();
    let config = temp.path().join("config.toml");

    datascope()
        .args([
            "--config",
            config.to_str().unwrap(),
            "--service",
            "nope",
            "containers",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown service 'nope'"));
}

#[test]
fn test_service_set_then_list_round_trips() {
    let temp = tempfile::TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    let config_arg = config.to_str().unwrap();

    datascope()
        .args([
            "--config",
            config_arg,
            "service",
            "set",
            "warehouse",
            "--endpoint",
            "http://localhost:8080",
            "--service-id",
            "3",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved service 'warehouse'"));

    datascope()
        .args(["--config", config_arg, "service", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("warehouse"))
        .stdout(predicate::str::contains("http://localhost:8080"));
}

#[test]
fn test_service_list_json() {
    let temp = tempfile::TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    let config_arg = config.to_str().unwrap();

    datascope()
        .args([
            "--config",
            config_arg,
            "service",
            "set",
            "warehouse",
            "--endpoint",
            "http://localhost:8080",
            "--service-id",
            "3",
        ])
        .assert()
        .success();

    datascope()
        .args(["--config", config_arg, "--format", "json", "service", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"service_id\": 3"));
}

#[test]
fn test_query_rejects_page_zero() {
    let temp = tempfile::TempDir::new().unwrap();
    let config = temp.path().join("config.toml");

    datascope()
        .args([
            "--config",
            config.to_str().unwrap(),
            "--endpoint",
            "http://localhost:1",
            "--service-id",
            "1",
            "query",
            "mydb/public",
            "events",
            "--page",
            "0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--page is 1-based"));
}

#[test]
fn test_malformed_path_is_rejected_before_any_request() {
    let temp = tempfile::TempDir::new().unwrap();
    let config = temp.path().join("config.toml");

    datascope()
        .args([
            "--config",
            config.to_str().unwrap(),
            "--endpoint",
            "http://localhost:1",
            "--service-id",
            "1",
            "entities",
            "mydb//public",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid path"));
}

#[test]
fn test_query_filter_flags_conflict() {
    datascope()
        .args([
            "query",
            "mydb/public",
            "events",
            "--filter",
            "id > 1",
            "--filter-json",
            "{}",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_desc_requires_sort() {
    datascope()
        .args(["query", "mydb/public", "events", "--desc"])
        .assert()
        .failure();
}
