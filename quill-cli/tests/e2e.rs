//! End-to-end tests for the quill binary
//!
//! These tests build and run the binary through cargo and are gated behind
//! the `integration` feature flag. Run with:
//!
//! ```sh
//! cargo test -p quill-cli --features integration
//! ```

#![cfg(feature = "integration")]

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Run quill with isolated data and project config directories
fn quill(data_dir: &Path, args: &[&str]) -> Output {
    Command::new("cargo")
        .args(["run", "-q", "-p", "quill-cli", "--"])
        .args(args)
        .env("QUILL_DATA_DIR", data_dir)
        .env("QUILL_PROJECT_CONFIG_DIR", data_dir.join("project"))
        .output()
        .expect("Failed to run quill")
}

#[test]
fn quill_help_lists_commands() {
    let temp_dir = TempDir::new().unwrap();
    let output = quill(temp_dir.path(), &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Manage AI provider profiles"));
    assert!(stdout.contains("providers"));
    assert!(stdout.contains("generate"));
}

#[test]
fn quill_config_show_works_without_config() {
    let temp_dir = TempDir::new().unwrap();
    let output = quill(temp_dir.path(), &["config", "show"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[provider]"));
    assert!(stdout.contains("timeout_secs = 30"));
    assert!(stdout.contains("max_retries = 3"));
}

#[test]
fn quill_profiles_survive_between_runs() {
    let temp_dir = TempDir::new().unwrap();
    let add = quill(
        temp_dir.path(),
        &[
            "providers",
            "add",
            "--name",
            "Local",
            "--endpoint",
            "http://127.0.0.1:1",
            "--model",
            "llama3",
            "--api-key",
            "sk-e2e",
        ],
    );
    assert!(add.status.success(), "{}", String::from_utf8_lossy(&add.stderr));
    assert!(temp_dir.path().join("ai-configs").exists());

    let list = quill(temp_dir.path(), &["--json", "providers", "list"]);
    assert!(list.status.success());
    let stdout = String::from_utf8_lossy(&list.stdout);
    assert!(stdout.contains("\"name\": \"Local\""));
    assert!(stdout.contains("\"selected\": true"));
    assert!(!stdout.contains("sk-e2e"));
}

#[test]
fn quill_models_cache_is_served_and_cleared_between_runs() {
    let temp_dir = TempDir::new().unwrap();
    let add = quill(
        temp_dir.path(),
        &[
            "providers",
            "add",
            "--name",
            "Offline",
            "--endpoint",
            "http://127.0.0.1:1",
            "--model",
            "llama3",
            "--api-key",
            "sk-e2e",
            "--max-retries",
            "0",
        ],
    );
    assert!(add.status.success(), "{}", String::from_utf8_lossy(&add.stderr));

    let configs: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(temp_dir.path().join("ai-configs")).unwrap())
            .unwrap();
    let id = configs[0]["id"].as_str().unwrap().to_string();
    let cache = serde_json::json!({
        id: [{
            "id": "cached-model",
            "name": "cached-model",
            "description": "",
            "capabilities": ["text_generation"],
            "max_tokens": null,
            "cost_per_1k_tokens": null,
            "kind": "text",
            "availability": "available"
        }]
    });
    let cache_path = temp_dir.path().join("model-cache");
    std::fs::write(&cache_path, cache.to_string()).unwrap();

    // The endpoint is unreachable, so only a cache hit can succeed
    let cached = quill(temp_dir.path(), &["--json", "models"]);
    assert!(cached.status.success(), "{}", String::from_utf8_lossy(&cached.stderr));
    assert!(String::from_utf8_lossy(&cached.stdout).contains("cached-model"));

    let clear = quill(temp_dir.path(), &["models", "--clear-cache"]);
    assert!(clear.status.success(), "{}", String::from_utf8_lossy(&clear.stderr));
    assert!(!cache_path.exists());

    let uncached = quill(temp_dir.path(), &["models"]);
    assert!(!uncached.status.success());

    // A refresh goes to the provider even with a cache entry present
    std::fs::write(&cache_path, cache.to_string()).unwrap();
    let refresh = quill(temp_dir.path(), &["models", "--refresh"]);
    assert!(!refresh.status.success());
}

#[test]
fn quill_test_without_profiles_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output = quill(temp_dir.path(), &["test"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No active profile"));
}
