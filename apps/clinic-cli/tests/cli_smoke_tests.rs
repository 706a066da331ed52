//! CLI smoke tests for the clinic binary
//!
//! These run the real executable against temp configs and, where the API is
//! involved, a mock server.

use std::path::Path;
use std::process::{Command, Stdio};

use httpmock::prelude::*;
use tempfile::TempDir;

/// Helper to run the clinic binary with given arguments
fn run_clinic(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_clinic"))
        .args(args)
        .env_remove("CLINIC_PASSWORD")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute clinic")
}

/// Write a config pointing at `base_url` with its home dir inside `dir`.
fn write_config(dir: &Path, base_url: &str) -> String {
    let home = dir.join("home");
    let config_path = dir.join("clinic.yaml");
    let yaml = format!(
        r#"
api:
  base_url: "{base_url}"
  timeout_sec: 5

session:
  home_dir: "{}"

logging:
  default:
    console_level: "off"
    file: ""
"#,
        home.to_string_lossy().replace('\\', "/")
    );
    std::fs::write(&config_path, yaml).expect("Failed to write config");
    config_path.to_string_lossy().to_string()
}

#[test]
fn test_cli_help_command() {
    let output = run_clinic(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("clinic"), "Should contain binary name");
    assert!(stdout.contains("Usage:"), "Should contain usage information");
    for sub in ["login", "logout", "patients", "appointments", "history", "check"] {
        assert!(stdout.contains(sub), "Should list '{}' subcommand", sub);
    }
    assert!(stdout.contains("--config"), "Should mention config option");
}

#[test]
fn test_cli_version_command() {
    let output = run_clinic(&["--version"]);

    assert!(output.status.success(), "Version command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("clinic"), "Should contain binary name");
    assert!(
        stdout.chars().any(|c| c.is_ascii_digit()),
        "Should contain version numbers"
    );
}

#[test]
fn test_cli_invalid_command() {
    let output = run_clinic(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error") || stderr.contains("unrecognized"),
        "Should contain error message about invalid command"
    );
}

#[test]
fn test_cli_missing_config_file() {
    let output = run_clinic(&["--config", "/nonexistent/clinic.yaml", "check"]);

    assert!(!output.status.success(), "Should fail with missing config");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("not found"),
        "Should mention config file issue: {}",
        stderr
    );
}

#[test]
fn test_cli_check_and_print_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(temp_dir.path(), "https://clinic.example.org");

    let output = run_clinic(&["--config", &config, "check"]);
    assert!(output.status.success(), "Check should pass: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration check passed"));
    assert!(stdout.contains("session.json"));

    let output = run_clinic(&[
        "--config",
        &config,
        "--api-url",
        "http://127.0.0.1:9000",
        "--print-config",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("http://127.0.0.1:9000"));
}

#[test]
fn test_cli_data_command_without_session_exits_with_2() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(temp_dir.path(), "http://127.0.0.1:1");

    let output = run_clinic(&["--config", &config, "patients", "list"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("clinic login"), "Should hint at login: {}", stderr);
}

#[test]
fn test_cli_login_then_list_then_logout() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/auth/login");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(serde_json::json!({"token": "jwt-cli", "username": "drperez", "rol": "MEDICO"}));
    });
    let list = server.mock(|when, then| {
        when.method(GET)
            .path("/api/pacientes")
            .header("authorization", "Bearer jwt-cli");
        then.status(200).header("content-type", "application/json").json_body(serde_json::json!([{
            "id": 1,
            "nombreCompleto": "Ana Quispe",
            "dni": "45879632",
            "codigoFacil": "GIN-001"
        }]));
    });

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(temp_dir.path(), &server.base_url());

    let output = run_clinic(&[
        "--config", &config, "login", "--username", "drperez", "--password", "secreto",
    ]);
    assert!(output.status.success(), "Login should succeed: {:?}", output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("drperez"));

    let output = run_clinic(&["--config", &config, "patients", "list", "--search", "quispe"]);
    assert!(output.status.success(), "List should succeed: {:?}", output);
    let listed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(listed[0]["codigoFacil"], "GIN-001");
    list.assert();

    let output = run_clinic(&["--config", &config, "logout"]);
    assert!(output.status.success());

    let output = run_clinic(&["--config", &config, "whoami"]);
    let whoami: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(whoami["authenticated"], false);
}

#[test]
fn test_cli_wrong_password_is_reported_coarsely() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/auth/login");
        then.status(401).body("Bad credentials: user drperez");
    });

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(temp_dir.path(), &server.base_url());

    let output = run_clinic(&[
        "--config", &config, "login", "-u", "drperez", "-p", "wrongpass",
    ]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid credentials"), "{}", stderr);
    assert!(!stderr.contains("Bad credentials"));
}
