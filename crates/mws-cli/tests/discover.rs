use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;

mod common;

use common::{parse_json, prepare_monorepo};

#[test]
fn list_reports_root_first_then_members_by_path() {
    let (_tmp, root) = prepare_monorepo("mws-list");
    let assert = cargo_bin_cmd!("mws")
        .current_dir(&root)
        .args(["--json", "list"])
        .assert()
        .success();
    let payload = parse_json(&assert);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["message"], "mws list: found 3 projects");

    let projects = payload["details"]["projects"]
        .as_array()
        .expect("projects array");
    let names: Vec<_> = projects.iter().filter_map(|p| p["name"].as_str()).collect();
    assert_eq!(names, vec!["mono", "a", "b"]);
    assert_eq!(projects[0]["is_root"], true);
    assert_eq!(projects[0]["relative_root"], "/");
    assert_eq!(projects[1]["relative_root"], "packages/a");
    assert_eq!(projects[2]["source"]["kind"], "cargo");
}

#[test]
fn list_applies_category_prefixes() {
    let (_tmp, root) = prepare_monorepo("mws-prefix");
    let assert = cargo_bin_cmd!("mws")
        .current_dir(&root)
        .args(["--json", "list"])
        .assert()
        .success();
    let payload = parse_json(&assert);
    let projects = payload["details"]["projects"].as_array().expect("projects");
    assert_eq!(projects[0]["label"], "✨ mono");
    assert_eq!(projects[1]["label"], "📚 a (npm workspace)");
    assert_eq!(projects[2]["label"], "b (Cargo)");
}

#[test]
fn list_honors_discovery_configuration() {
    let (_tmp, root) = prepare_monorepo("mws-config");
    fs::write(
        root.join("mws.toml"),
        concat!(
            "include-root = false\n\n",
            "[[folders.custom]]\n",
            "regex = \"^rust\"\n",
            "prefix = \"🦀\"\n",
        ),
    )
    .expect("write mws.toml");

    let assert = cargo_bin_cmd!("mws")
        .current_dir(&root)
        .args(["--json", "list"])
        .assert()
        .success();
    let payload = parse_json(&assert);
    let projects = payload["details"]["projects"].as_array().expect("projects");
    assert_eq!(projects.len(), 2);
    let crab = projects
        .iter()
        .find(|p| p["name"] == "b")
        .expect("cargo member");
    assert_eq!(crab["prefix"], "🦀");
}

#[test]
fn list_without_workspace_file_is_a_noop() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let assert = cargo_bin_cmd!("mws")
        .current_dir(tmp.path())
        .args(["--json", "list"])
        .assert()
        .success();
    let payload = parse_json(&assert);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["details"]["noop"], true);
}
