use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::RawProject;
use crate::diag::DiagnosticSink;

/// Nx project-graph detector, applicable only when `nx.json` sits at the
/// workspace root.
///
/// Declared projects come from the `projects` maps of `workspace.json` /
/// `angular.json` (values are either a root string or an object with a
/// `root` field), plus standalone `project.json` manifests found by
/// walking the tree. `node_modules` and hidden directories are never
/// descended into.
pub(crate) async fn projects(cwd: &Path, sink: &dyn DiagnosticSink) -> Vec<RawProject> {
    if !cwd.join("nx.json").exists() {
        return Vec::new();
    }

    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut projects = Vec::new();

    for file in ["workspace.json", "angular.json"] {
        let path = cwd.join(file);
        let Ok(contents) = tokio::fs::read_to_string(&path).await else {
            continue;
        };
        let value: Value = match serde_json::from_str(&contents) {
            Ok(value) => value,
            Err(err) => {
                report_parse_error(sink, &path.display().to_string(), &err.to_string());
                continue;
            }
        };
        let Some(map) = value.get("projects").and_then(Value::as_object) else {
            continue;
        };
        for (name, entry) in map {
            let rel = match entry {
                Value::String(rel) => rel.clone(),
                Value::Object(obj) => match obj.get("root").and_then(Value::as_str) {
                    Some(rel) => rel.to_string(),
                    None => continue,
                },
                _ => continue,
            };
            let root = cwd.join(&rel);
            if seen.insert(root.clone()) {
                projects.push(RawProject {
                    name: name.clone(),
                    root,
                });
            }
        }
    }

    let walker = ignore::WalkBuilder::new(cwd)
        .follow_links(false)
        .filter_entry(|entry| entry.file_name() != "node_modules")
        .build();
    for entry in walker.flatten() {
        if entry.file_name() != "project.json" {
            continue;
        }
        if !entry.file_type().is_some_and(|file_type| file_type.is_file()) {
            continue;
        }
        let manifest = entry.path();
        let Some(dir) = manifest.parent().map(Path::to_path_buf) else {
            continue;
        };
        if !seen.insert(dir.clone()) {
            continue;
        }
        let contents = match tokio::fs::read_to_string(manifest).await {
            Ok(contents) => contents,
            Err(_) => continue,
        };
        let value: Value = match serde_json::from_str(&contents) {
            Ok(value) => value,
            Err(err) => {
                report_parse_error(sink, &manifest.display().to_string(), &err.to_string());
                continue;
            }
        };
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| dir.file_name().map(|n| n.to_string_lossy().into_owned()));
        let Some(name) = name else { continue };
        projects.push(RawProject { name, root: dir });
    }

    projects
}

fn report_parse_error(sink: &dyn DiagnosticSink, path: &str, err: &str) {
    tracing::warn!(path, err, "malformed Nx project manifest");
    sink.emit(&format!("failed to parse {path}: {err}"));
}
