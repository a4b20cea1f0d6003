//! Integration tests that verify JSON output matches the published JSON schemas.
//!
//! Schemas come from the `schema` subcommand, so the check covers both the
//! generated schema and the serialized output.

use jsonschema::Validator;
use serde_json::Value;
use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn schema_canvas_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_schema-canvas"))
}

fn load_schema(name: &str) -> Validator {
    let output = schema_canvas_bin()
        .args(["schema", "--command", name])
        .output()
        .expect("Failed to run schema command");
    assert!(output.status.success(), "schema command failed for {}", name);

    let schema: Value = serde_json::from_slice(&output.stdout).expect("Invalid schema JSON");
    Validator::new(&schema).expect("Failed to compile schema")
}

fn validate_json_output(output: &Output, schema_name: &str) {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "Command failed with stderr: {}",
        stderr
    );

    let json: Value = serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("Invalid JSON output: {}\nOutput: {}", e, stdout));

    let validator = load_schema(schema_name);
    let errors: Vec<String> = validator.iter_errors(&json).map(|e| e.to_string()).collect();

    assert!(
        errors.is_empty(),
        "JSON output doesn't match {} schema:\n  - {}\n\nOutput was:\n{}",
        schema_name,
        errors.join("\n  - "),
        stdout
    );
}

fn create_script(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("schema.sql");
    fs::write(
        &path,
        r#"
CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR(255));
CREATE TABLE orders (
  id INT PRIMARY KEY,
  user_id INT,
  coupon_id INT,
  FOREIGN KEY (user_id) REFERENCES users(id),
  FOREIGN KEY (coupon_id) REFERENCES coupons(id)
);
CREATE TABLE categories (id INT PRIMARY KEY, parent_id INT REFERENCES categories(id));
"#,
    )
    .unwrap();
    path
}

// =============================================================================
// Layout Command
// =============================================================================

#[test]
fn test_layout_json_matches_schema() {
    let dir = TempDir::new().unwrap();
    let script = create_script(&dir);

    for strategy in ["grid", "circular", "spring"] {
        let output = schema_canvas_bin()
            .args([
                "layout",
                script.to_str().unwrap(),
                "--strategy",
                strategy,
                "--seed",
                "7",
            ])
            .output()
            .unwrap();
        validate_json_output(&output, "layout");
    }
}

#[test]
fn test_layout_empty_schema_matches_schema() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("empty.sql");
    fs::write(&script, "-- nothing here\n").unwrap();

    let output = schema_canvas_bin()
        .args(["layout", script.to_str().unwrap()])
        .output()
        .unwrap();
    validate_json_output(&output, "layout");
}

// =============================================================================
// Tables Command
// =============================================================================

#[test]
fn test_tables_json_matches_schema() {
    let dir = TempDir::new().unwrap();
    let script = create_script(&dir);

    let output = schema_canvas_bin()
        .args(["tables", script.to_str().unwrap(), "--json"])
        .output()
        .unwrap();
    validate_json_output(&output, "tables");
}

// =============================================================================
// Preview Command
// =============================================================================

#[test]
fn test_preview_json_matches_schema() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.duckdb");
    {
        let conn = duckdb::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE events (id INTEGER, happened TIMESTAMP, payload BLOB);
             INSERT INTO events VALUES (1, TIMESTAMP '2024-05-01 08:30:00', 'abc'::BLOB), (2, NULL, NULL);",
        )
        .unwrap();
    }

    let output = schema_canvas_bin()
        .args(["preview", path.to_str().unwrap(), "events", "--json"])
        .output()
        .unwrap();
    validate_json_output(&output, "preview");
}

// =============================================================================
// Schema Command
// =============================================================================

#[test]
fn test_schema_output_dir() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("schemas");

    let status = schema_canvas_bin()
        .args(["schema", "--output-dir", out.to_str().unwrap()])
        .status()
        .unwrap();

    assert!(status.success());
    for name in ["layout", "preview", "tables"] {
        let path = out.join(format!("{}.schema.json", name));
        let content = fs::read_to_string(&path).unwrap();
        let schema: Value = serde_json::from_str(&content).unwrap();
        assert!(Validator::new(&schema).is_ok(), "{} schema does not compile", name);
    }
}

#[test]
fn test_unknown_schema_name_fails() {
    let output = schema_canvas_bin()
        .args(["schema", "--command", "split"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
