use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::json;

mod common;

use common::{folder_names, parse_json, prepare_monorepo, read_workspace_file, write_json};

#[test]
fn update_attaches_discovered_folders_once() {
    let (_tmp, root) = prepare_monorepo("mws-update");
    let assert = cargo_bin_cmd!("mws")
        .current_dir(&root)
        .args(["--json", "update"])
        .assert()
        .success();
    let payload = parse_json(&assert);
    assert_eq!(payload["details"]["changed"], true);
    assert_eq!(
        payload["details"]["folders"].as_array().expect("folders").len(),
        3
    );

    // Second pass sees the same folder set and must not rewrite the file.
    let assert = cargo_bin_cmd!("mws")
        .current_dir(&root)
        .args(["--json", "update"])
        .assert()
        .success();
    let payload = parse_json(&assert);
    assert_eq!(payload["details"]["changed"], false);
    assert_eq!(
        payload["message"],
        "mws update: workspace folders already up to date"
    );
}

#[test]
fn update_keeps_manual_folders_unless_replacing() {
    let (_tmp, root) = prepare_monorepo("mws-manual");
    fs::create_dir_all(root.join("scratch")).expect("scratch dir");
    write_json(
        &root.join("mono.code-workspace"),
        &json!({ "folders": [
            { "path": ".", "name": "mono" },
            { "path": "scratch", "name": "scratch" },
        ]}),
    );

    cargo_bin_cmd!("mws")
        .current_dir(&root)
        .args(["--json", "update"])
        .assert()
        .success();
    let names = folder_names(&read_workspace_file(&root));
    assert_eq!(names.len(), 4);
    assert!(names.contains(&"scratch".to_string()), "merge keeps extras");

    cargo_bin_cmd!("mws")
        .current_dir(&root)
        .args(["--json", "update", "--replace"])
        .assert()
        .success();
    let names = folder_names(&read_workspace_file(&root));
    assert_eq!(names.len(), 3);
    assert!(!names.contains(&"scratch".to_string()));
}

#[test]
fn add_is_idempotent_per_project() {
    let (_tmp, root) = prepare_monorepo("mws-add");
    let assert = cargo_bin_cmd!("mws")
        .current_dir(&root)
        .args(["--json", "add", "a"])
        .assert()
        .success();
    assert_eq!(parse_json(&assert)["details"]["changed"], true);

    let assert = cargo_bin_cmd!("mws")
        .current_dir(&root)
        .args(["--json", "add", "a"])
        .assert()
        .success();
    assert_eq!(parse_json(&assert)["details"]["changed"], false);
    assert_eq!(folder_names(&read_workspace_file(&root)).len(), 2);
}

#[test]
fn open_replaces_the_folder_set_with_one_project() {
    let (_tmp, root) = prepare_monorepo("mws-open");
    cargo_bin_cmd!("mws")
        .current_dir(&root)
        .args(["--json", "open", "b"])
        .assert()
        .success();
    let document = read_workspace_file(&root);
    let folders = document["folders"].as_array().expect("folders");
    assert_eq!(folders.len(), 1);
    let path = folders[0]["path"].as_str().expect("path");
    assert!(path.ends_with("rust/b"));
}

#[test]
fn open_new_window_writes_a_standalone_workspace_file() {
    let (_tmp, root) = prepare_monorepo("mws-open-new");
    let assert = cargo_bin_cmd!("mws")
        .current_dir(&root)
        .args(["--json", "open", "b", "--new-window"])
        .assert()
        .success();
    let payload = parse_json(&assert);
    let file = payload["details"]["workspace_file"]
        .as_str()
        .expect("workspace_file");
    assert!(file.ends_with("b.code-workspace"));
    assert!(std::path::Path::new(file).exists());

    // The original workspace is left alone.
    assert_eq!(folder_names(&read_workspace_file(&root)), vec!["mono"]);
}

#[test]
fn open_new_window_never_clobbers_the_open_workspace_file() {
    let (_tmp, root) = prepare_monorepo("mws-clobber");
    // Root project and workspace file share the stem "mono".
    write_json(
        &root.join("mono.code-workspace"),
        &json!({
            "folders": [{ "path": ".", "name": "mono" }],
            "settings": { "editor.formatOnSave": true },
        }),
    );

    let assert = cargo_bin_cmd!("mws")
        .current_dir(&root)
        .args(["--json", "open", "mono", "--new-window"])
        .assert()
        .failure()
        .code(1);
    let payload = parse_json(&assert);
    assert_eq!(payload["status"], "user-error");

    let document = read_workspace_file(&root);
    assert_eq!(document["settings"]["editor.formatOnSave"], true);
    assert_eq!(folder_names(&document), vec!["mono"]);
}

#[test]
fn select_sets_the_exact_folder_set() {
    let (_tmp, root) = prepare_monorepo("mws-select");
    let assert = cargo_bin_cmd!("mws")
        .current_dir(&root)
        .args(["--json", "select", "a", "b"])
        .assert()
        .success();
    let payload = parse_json(&assert);
    assert_eq!(payload["details"]["changed"], true);

    let document = read_workspace_file(&root);
    let folders = document["folders"].as_array().expect("folders");
    assert_eq!(folders.len(), 2);
    let paths: Vec<_> = folders
        .iter()
        .filter_map(|f| f["path"].as_str())
        .collect();
    assert!(paths.iter().any(|p| p.ends_with("packages/a")));
    assert!(paths.iter().any(|p| p.ends_with("rust/b")));
}

#[test]
fn select_without_names_prints_the_picker_model() {
    let (_tmp, root) = prepare_monorepo("mws-picker");
    let assert = cargo_bin_cmd!("mws")
        .current_dir(&root)
        .args(["--json", "select"])
        .assert()
        .success();
    let payload = parse_json(&assert);
    let items = payload["details"]["items"].as_array().expect("items");
    assert_eq!(items.len(), 3);

    let root_item = items.iter().find(|i| i["name"] == "mono").expect("root");
    assert_eq!(root_item["picked"], true, "open folder is pre-selected");
    let member = items.iter().find(|i| i["name"] == "a").expect("member");
    assert_eq!(member["picked"], false);
    assert_eq!(member["discovered"], true);
}

#[test]
fn select_rejects_unknown_project_names() {
    let (_tmp, root) = prepare_monorepo("mws-unknown");
    let assert = cargo_bin_cmd!("mws")
        .current_dir(&root)
        .args(["--json", "select", "a", "zzz"])
        .assert()
        .failure()
        .code(1);
    let payload = parse_json(&assert);
    assert_eq!(payload["status"], "user-error");
    assert_eq!(payload["details"]["unknown"], "zzz");

    // A failed selection leaves the folder set untouched.
    assert_eq!(folder_names(&read_workspace_file(&root)), vec!["mono"]);
}
