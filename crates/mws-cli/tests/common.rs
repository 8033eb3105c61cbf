#![allow(dead_code)]

use std::{fs, path::PathBuf};

use assert_cmd::assert::Assert;
use serde_json::{json, Value};
use tempfile::TempDir;

/// Lays out a small monorepo with an npm workspace member, a Cargo
/// workspace member, and a `.code-workspace` file whose only folder is
/// the repo root.
pub fn prepare_monorepo(prefix: &str) -> (TempDir, PathBuf) {
    let temp = tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("tempdir");
    let root = temp.path().join("mono");
    fs::create_dir_all(root.join("packages/a")).expect("packages/a");
    fs::create_dir_all(root.join("rust/b")).expect("rust/b");

    write_json(
        &root.join("package.json"),
        &json!({ "name": "mono", "workspaces": ["packages/*"] }),
    );
    write_json(
        &root.join("packages/a/package.json"),
        &json!({ "name": "a" }),
    );
    fs::write(
        root.join("Cargo.toml"),
        "[workspace]\nmembers = [\"rust/b\"]\n",
    )
    .expect("root Cargo.toml");
    fs::write(
        root.join("rust/b/Cargo.toml"),
        "[package]\nname = \"b\"\nversion = \"0.1.0\"\n",
    )
    .expect("member Cargo.toml");
    write_json(
        &root.join("mono.code-workspace"),
        &json!({ "folders": [{ "path": ".", "name": "mono" }] }),
    );

    let root = root.canonicalize().expect("canonical root");
    (temp, root)
}

pub fn write_json(path: &std::path::Path, value: &Value) {
    fs::write(path, serde_json::to_string_pretty(value).expect("render"))
        .expect("write json");
}

pub fn read_workspace_file(root: &std::path::Path) -> Value {
    let contents =
        fs::read_to_string(root.join("mono.code-workspace")).expect("read workspace file");
    serde_json::from_str(&contents).expect("valid workspace json")
}

pub fn folder_names(document: &Value) -> Vec<String> {
    document["folders"]
        .as_array()
        .expect("folders array")
        .iter()
        .filter_map(|folder| folder["name"].as_str())
        .map(str::to_string)
        .collect()
}

pub fn parse_json(assert: &Assert) -> Value {
    serde_json::from_slice(&assert.get_output().stdout).expect("valid json")
}
