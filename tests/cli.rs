mod common;

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn memctx(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("memctx").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

// `memctx` with no args should exit with a non-zero code.
#[test]
fn cli_no_args() {
    Command::cargo_bin("memctx").unwrap().assert().failure();
}

// `memctx -V` should print the version
#[test]
fn cli_version() {
    Command::cargo_bin("memctx")
        .unwrap()
        .args(&["-V"])
        .assert()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_list_without_file() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    memctx(&temp_dir.path().join("contexts.json"))
        .arg("list")
        .assert()
        .success()
        .stdout("no contexts\n");
}

#[test]
fn cli_add_edit_rm_list() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let config = temp_dir.path().join("contexts.json");

    memctx(&config).args(&["add", "local", "127.0.0.1"]).assert().success();
    memctx(&config).args(&["add", "remote", "10.0.0.5", "4000"]).assert().success();
    memctx(&config)
        .arg("list")
        .assert()
        .success()
        .stdout("0: local (127.0.0.1:11211)\n1: remote (10.0.0.5:4000)\n");

    memctx(&config).args(&["edit", "0", "home", "localhost", "11212"]).assert().success();
    memctx(&config).args(&["rm", "1"]).assert().success();
    memctx(&config)
        .arg("list")
        .assert()
        .success()
        .stdout("0: home (localhost:11212)\n");

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config).unwrap()).unwrap();
    assert_eq!(
        saved,
        serde_json::json!([{"name": "home", "host": "localhost", "port": 11212}])
    );
}

#[test]
fn cli_add_invalid_port() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let config = temp_dir.path().join("contexts.json");

    memctx(&config)
        .args(&["add", "local", "127.0.0.1", "65536"])
        .assert()
        .failure()
        .stderr(contains("invalid port"));
    assert!(!config.exists());
}

#[test]
fn cli_rm_out_of_range() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let config = temp_dir.path().join("contexts.json");

    memctx(&config).args(&["add", "local", "127.0.0.1"]).assert().success();
    memctx(&config)
        .args(&["rm", "3"])
        .assert()
        .failure()
        .stderr(contains("no context at index 3"));
    memctx(&config).args(&["rm", "x"]).assert().failure();
}

#[test]
fn cli_list_corrupt_file_fails() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let config = temp_dir.path().join("contexts.json");
    fs::write(&config, "{not json").unwrap();

    memctx(&config)
        .arg("list")
        .assert()
        .failure()
        .stderr(contains("could not parse context file"));
}

#[test]
fn cli_get_without_connection() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let config = temp_dir.path().join("contexts.json");

    memctx(&config)
        .args(&["get", "0", "key"])
        .assert()
        .failure()
        .stderr(contains("no context at index 0"));
}

#[test]
fn cli_get_value_and_missing_key() {
    let port = common::spawn_server(&[("greeting", "hello")]);
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let config = temp_dir.path().join("contexts.json");
    fs::write(
        &config,
        format!(r#"[{{"name":"local","host":"127.0.0.1","port":"{}"}}]"#, port),
    )
    .unwrap();

    memctx(&config)
        .args(&["get", "0", "greeting"])
        .assert()
        .success()
        .stdout("hello\n");
    memctx(&config)
        .args(&["get", "0", "missing-key"])
        .assert()
        .success()
        .stdout("Key not found\n");
}

#[test]
fn cli_shell_session() {
    let port = common::spawn_server(&[("greeting", "hello")]);
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let config = temp_dir.path().join("contexts.json");

    let script = format!(
        "add local 127.0.0.1 {}\nlist\nget greeting\nuse 0\nconnect\nget greeting\nget nope\nlog\nquit\n",
        port
    );
    memctx(&config)
        .arg("shell")
        .write_stdin(script)
        .assert()
        .success()
        .stdout(
            contains(format!("0: local (127.0.0.1:{})", port))
                .and(contains("error: not connected"))
                .and(contains(format!("connected to 127.0.0.1:{}", port)))
                .and(contains("hello\n"))
                .and(contains("Key not found"))
                .and(contains("result: key not found")),
        );
    assert!(config.exists());
}

#[test]
fn cli_shell_survives_corrupt_file() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let config = temp_dir.path().join("contexts.json");
    fs::write(&config, "[1, 2").unwrap();

    memctx(&config)
        .arg("shell")
        .write_stdin("list\nconnect\n")
        .assert()
        .success()
        .stdout(contains("no contexts").and(contains("error: select a context first")))
        .stderr(contains("warning"));
}
