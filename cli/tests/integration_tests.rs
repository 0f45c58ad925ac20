use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const SERVER_SCHEMA: &str = r#"
name: server
help: Starts the server.
fields:
  - name: Port
    kind: unsigned
    required: true
    short: p
    example: "8080"
    description: Listen port
  - name: Hosts
    kind: { collection: { shape: list, element: string } }
    default: localhost
  - name: Ids
    kind: { collection: { shape: list, element: integer } }
  - name: Verbose
    kind: bool
  - name: Level
    kind: { choice: [Low, High] }
  - name: Password
    kind: secure
"#;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("failed to write test file");
    path
}

fn switchbind(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_switchbind"))
        .args(args)
        .output()
        .expect("failed to run switchbind")
}

fn bind(schema: &Path, extra: &[&str]) -> Output {
    let mut args = vec!["bind", "--schema", schema.to_str().unwrap()];
    args.extend_from_slice(extra);
    switchbind(&args)
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ---------------------------------------------------------------------------
// tokenize
// ---------------------------------------------------------------------------

#[test]
fn tokenize_prints_groups() {
    let output = switchbind(&[
        "tokenize", "--", "garbage", "/int", "123", "-bool", "T", "/string", "This", "is",
    ]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    let groups = json["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0]["name"], "int");
    assert_eq!(groups[0]["argument"], "123");
    assert_eq!(groups[1]["identifier"], "-");
    assert_eq!(groups[2]["argument"], "This is");
    assert_eq!(json["ignored"].as_array().unwrap().len(), 0);
}

#[test]
fn tokenize_rejects_repeated_switch_when_configured() {
    let dir = TempDir::new().unwrap();
    let settings = write_file(&dir, "settings.yaml", "throw_on_multiple_switch_use: true\n");
    let output = switchbind(&[
        "tokenize",
        "--settings",
        settings.to_str().unwrap(),
        "--",
        "/a",
        "1",
        "/A",
        "2",
    ]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("used multiple times"), "stderr: {stderr}");
}

// ---------------------------------------------------------------------------
// bind
// ---------------------------------------------------------------------------

#[test]
fn bind_prints_typed_values() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "server.yaml", SERVER_SCHEMA);
    let output = bind(
        &schema,
        &["--", "/p", "8080", "/ids", "1-3,7", "/verbose", "/level", "high"],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json = stdout_json(&output);
    assert_eq!(json["values"]["port"], 8080);
    assert_eq!(json["values"]["ids"], serde_json::json!([1, 2, 3, 7]));
    assert_eq!(json["values"]["verbose"], true);
    assert_eq!(json["values"]["level"], "High");
    assert_eq!(json["values"]["hosts"], serde_json::json!(["localhost"]));
    assert_eq!(json["help_requested"], false);
}

#[test]
fn bind_redacts_secure_values() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "server.yaml", SERVER_SCHEMA);
    let settings = write_file(&dir, "settings.yaml", "force_secure: false\n");
    let output = bind(
        &schema,
        &[
            "--settings",
            settings.to_str().unwrap(),
            "--",
            "/p",
            "1",
            "/password",
            "hunter2",
        ],
    );
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("hunter2"));
    assert!(stdout_json(&output)["values"]["password"].is_string());
}

#[test]
fn bind_collects_conversion_failures() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "server.yaml", SERVER_SCHEMA);
    let output = bind(&schema, &["--", "/p", "1", "/ids", "one"]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    let errors = json["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(
        errors[0]
            .as_str()
            .unwrap()
            .starts_with("Cannot parse [Ids] from input \"one\"")
    );
    assert_eq!(json["ignored"], serde_json::json!(["/ids one"]));
}

#[test]
fn bind_missing_required_is_fatal_with_usage() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "server.yaml", SERVER_SCHEMA);
    let output = bind(&schema, &["--", "/verbose"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage: server [switches]"), "stderr: {stderr}");
    assert!(stderr.contains("error: /p is a required parameter"), "stderr: {stderr}");
}

#[test]
fn bind_without_usage_on_errors() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "server.yaml", SERVER_SCHEMA);
    let settings = write_file(&dir, "settings.yaml", "show_help_on_errors: false\n");
    let output = bind(&schema, &["--settings", settings.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("Usage:"));
}

#[test]
fn bind_help_request_exits_with_help_status() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "server.yaml", SERVER_SCHEMA);
    let output = bind(&schema, &["--", "/?"]);

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Usage: server [switches]"));
    assert!(stdout.contains("/p:[8080]"));
    assert!(!stdout.contains("/password"));
}

#[test]
fn bind_reads_json_schema() {
    let dir = TempDir::new().unwrap();
    let json = serde_json::json!({
        "name": "tool",
        "fields": [
            { "name": "Count", "kind": "integer", "default": "5" },
            { "name": "When", "kind": "date_time" }
        ]
    });
    let schema = write_file(&dir, "tool.json", &json.to_string());
    let output = bind(&schema, &["--", "-when", "2024-05-01"]);
    assert!(output.status.success());

    let values = &stdout_json(&output)["values"];
    assert_eq!(values["count"], 5);
    assert_eq!(values["when"], "2024-05-01T00:00:00");
}

#[test]
fn bind_rejects_invalid_schema() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(
        &dir,
        "bad.yaml",
        "name: bad\nfields:\n  - name: A\n    kind: string\n    short: x\n  - name: B\n    kind: string\n    short: X\n",
    );
    let output = bind(&schema, &[]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid schema"), "stderr: {stderr}");
}

// ---------------------------------------------------------------------------
// usage and settings
// ---------------------------------------------------------------------------

#[test]
fn usage_prints_fields() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "server.yaml", SERVER_SCHEMA);
    let output = switchbind(&["usage", "--schema", schema.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Starts the server."));
    assert!(stdout.contains("Listen port (required)"));
    assert!(stdout.contains("/? | /help"));
}

#[test]
fn settings_roundtrip_through_file() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "in.yaml", "list_separators: [';']\nprompt_timeout_secs: 5\n");
    let saved = dir.path().join("out.yaml");
    let output = switchbind(&[
        "settings",
        input.to_str().unwrap(),
        "--output",
        saved.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let yaml = fs::read_to_string(&saved).unwrap();
    assert!(yaml.contains("prompt_timeout_secs: 5"));
    assert!(yaml.contains("throw_on_schema_violation: true"));
}

#[test]
fn settings_rejects_invalid_file() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "in.yaml", "switch_identifiers: []\n");
    let output = switchbind(&["settings", input.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid settings"), "stderr: {stderr}");
}
