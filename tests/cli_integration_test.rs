//! Integration tests for the schema-canvas binary.

use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

fn schema_canvas() -> Command {
    Command::new(env!("CARGO_BIN_EXE_schema-canvas"))
}

fn create_schema_script(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("shop.sql");
    fs::write(
        &path,
        r#"
CREATE TABLE users (
  id INT PRIMARY KEY,
  name VARCHAR(255)
);

CREATE TABLE orders (
  id INT PRIMARY KEY,
  user_id INT,
  FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE TABLE order_items (
  id INT PRIMARY KEY,
  order_id INT,
  product_id INT,
  FOREIGN KEY (order_id) REFERENCES orders(id),
  FOREIGN KEY (product_id) REFERENCES products(id)
);

CREATE TABLE audit_log (
  id INT PRIMARY KEY,
  note TEXT
);
"#,
    )
    .unwrap();
    path
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
}

fn table_names(scene: &Value) -> Vec<String> {
    scene["tables"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_layout_grid_scene() {
    let dir = TempDir::new().unwrap();
    let script = create_schema_script(&dir);

    let output = schema_canvas()
        .args(["layout", script.to_str().unwrap()])
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    let scene = stdout_json(&output);

    assert_eq!(scene["strategy"], "grid");
    assert!(scene.get("seed").is_none());
    assert_eq!(
        table_names(&scene),
        vec!["users", "orders", "order_items", "audit_log"]
    );
    assert_eq!(scene["tables"][0]["x"], 50.0);
    assert_eq!(scene["tables"][1]["x"], 300.0);
    assert_eq!(scene["stats"]["relationship_count"], 2);
    assert_eq!(scene["warnings"].as_array().unwrap().len(), 1);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("products"), "stderr: {}", stderr);
    assert_eq!(stderr.matches("Dangling foreign key").count(), 1, "stderr: {}", stderr);
}

#[test]
fn test_tables_text_reports_dangling_key_once() {
    let dir = TempDir::new().unwrap();
    let script = create_schema_script(&dir);

    let output = schema_canvas()
        .args(["tables", script.to_str().unwrap()])
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(
        stderr
            .matches("Dangling foreign key order_items.product_id -> products.id")
            .count(),
        1,
        "stderr: {}",
        stderr
    );
}

#[test]
fn test_layout_spring_seed_is_reproducible() {
    let dir = TempDir::new().unwrap();
    let script = create_schema_script(&dir);

    let run = || {
        let output = schema_canvas()
            .args([
                "layout",
                script.to_str().unwrap(),
                "--strategy",
                "spring",
                "--seed",
                "42",
            ])
            .output()
            .unwrap();
        stdout_json(&output)
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);
    assert_eq!(first["seed"], 42);
    assert_eq!(first["strategy"], "spring");
}

#[test]
fn test_layout_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let script = create_schema_script(&dir);
    let out = dir.path().join("scene.json");

    let status = schema_canvas()
        .args([
            "layout",
            script.to_str().unwrap(),
            "--strategy",
            "circular",
            "-o",
            out.to_str().unwrap(),
        ])
        .status()
        .unwrap();

    assert!(status.success());
    let scene: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(scene["strategy"], "circular");
    assert_eq!(scene["stats"]["table_count"], 4);
}

#[test]
fn test_layout_focus_and_exclude() {
    let dir = TempDir::new().unwrap();
    let script = create_schema_script(&dir);

    let output = schema_canvas()
        .args([
            "layout",
            script.to_str().unwrap(),
            "--focus",
            "orders",
            "--depth",
            "1",
        ])
        .output()
        .unwrap();
    let scene = stdout_json(&output);
    assert_eq!(table_names(&scene), vec!["users", "orders", "order_items"]);

    let output = schema_canvas()
        .args(["layout", script.to_str().unwrap(), "--exclude", "order*"])
        .output()
        .unwrap();
    let scene = stdout_json(&output);
    assert_eq!(table_names(&scene), vec!["users", "audit_log"]);
    assert_eq!(scene["stats"]["relationship_count"], 0);
}

#[test]
fn test_layout_config_file() {
    let dir = TempDir::new().unwrap();
    let script = create_schema_script(&dir);
    let config = dir.path().join("layout.yaml");
    fs::write(&config, "grid:\n  margin: 10\n").unwrap();

    let output = schema_canvas()
        .args([
            "layout",
            script.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    let scene = stdout_json(&output);
    assert_eq!(scene["tables"][0]["x"], 10.0);
    assert_eq!(scene["tables"][0]["y"], 10.0);
}

#[test]
fn test_layout_unknown_strategy_fails() {
    let dir = TempDir::new().unwrap();
    let script = create_schema_script(&dir);

    let output = schema_canvas()
        .args(["layout", script.to_str().unwrap(), "--strategy", "tree"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown layout strategy"));
}

#[test]
fn test_layout_unknown_focus_fails() {
    let dir = TempDir::new().unwrap();
    let script = create_schema_script(&dir);

    let output = schema_canvas()
        .args(["layout", script.to_str().unwrap(), "--focus", "ghosts"])
        .output()
        .unwrap();

    assert!(!output.status.success());
}

#[test]
fn test_missing_source_fails() {
    let dir = TempDir::new().unwrap();
    let output = schema_canvas()
        .args(["tables", dir.path().join("nope.duckdb").to_str().unwrap()])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("nope.duckdb"));
}

#[test]
fn test_tables_json() {
    let dir = TempDir::new().unwrap();
    let script = create_schema_script(&dir);

    let output = schema_canvas()
        .args(["tables", script.to_str().unwrap(), "--json"])
        .output()
        .unwrap();
    let report = stdout_json(&output);

    assert_eq!(report["stats"]["table_count"], 4);
    assert_eq!(report["stats"]["warning_count"], 1);
    assert_eq!(report["tables"][0]["referenced_by"]["id"][0], "orders");
    assert_eq!(report["tables"][1]["columns"][1]["role"], "foreign_key");
    assert_eq!(report["tables"][1]["columns"][1]["references"], "users.id");
}

#[test]
fn test_tables_text_with_explicit_kind() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("schema.txt");
    fs::write(&script, "CREATE TABLE users (id INT PRIMARY KEY, name TEXT);").unwrap();

    let output = schema_canvas()
        .args(["tables", script.to_str().unwrap(), "--kind", "sql"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("users"));
    assert!(stdout.contains("PK id"));
}

#[test]
fn test_preview_rejects_script() {
    let dir = TempDir::new().unwrap();
    let script = create_schema_script(&dir);

    let output = schema_canvas()
        .args(["preview", script.to_str().unwrap(), "users"])
        .output()
        .unwrap();

    assert!(!output.status.success());
}

#[test]
fn test_preview_database_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.duckdb");
    {
        let conn = duckdb::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name VARCHAR);
             INSERT INTO users VALUES (1, 'Alice'), (2, 'Bob'), (3, 'Carol');",
        )
        .unwrap();
    }

    let output = schema_canvas()
        .args(["preview", path.to_str().unwrap(), "users", "--limit", "2", "--json"])
        .output()
        .unwrap();
    let preview = stdout_json(&output);

    assert_eq!(preview["table"], "users");
    assert_eq!(preview["columns"], serde_json::json!(["id", "name"]));
    assert_eq!(preview["rows"].as_array().unwrap().len(), 2);
    assert_eq!(preview["rows"][1][1], "Bob");
}

#[test]
fn test_sqlite_database_tables_and_preview() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE settings (key TEXT PRIMARY KEY, value TEXT);
             CREATE TABLE users (id INTEGER PRIMARY KEY, theme TEXT REFERENCES settings(key));
             INSERT INTO settings VALUES ('dark', '1'), ('light', '0');",
        )
        .unwrap();
    }

    let output = schema_canvas()
        .args(["tables", path.to_str().unwrap(), "--json"])
        .output()
        .unwrap();
    let report = stdout_json(&output);
    assert_eq!(report["stats"]["relationship_count"], 1);
    assert_eq!(report["tables"][1]["columns"][1]["references"], "settings.key");

    let output = schema_canvas()
        .args(["preview", path.to_str().unwrap(), "settings", "--json"])
        .output()
        .unwrap();
    let preview = stdout_json(&output);
    assert_eq!(preview["columns"], serde_json::json!(["key", "value"]));
    assert_eq!(preview["rows"][1][0], "light");
}

#[test]
fn test_schema_command_lists_outputs() {
    let output = schema_canvas().arg("schema").output().unwrap();
    let schemas = stdout_json(&output);

    for name in ["layout", "preview", "tables"] {
        assert!(schemas.get(name).is_some(), "missing schema {}", name);
    }
}

#[test]
fn test_completions() {
    let output = schema_canvas().args(["completions", "bash"]).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("schema-canvas"));
}
