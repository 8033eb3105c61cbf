use std::path::Path;

use toml_edit::{DocumentMut, Item};

use super::RawProject;
use crate::diag::DiagnosticSink;

/// Cargo workspace detector.
///
/// Looks for `Cargo.toml` directly under `cwd` and walks
/// `workspace.members` in manifest order. Members without their own
/// `Cargo.toml` are skipped silently; members whose manifest lacks a
/// `package.name` contribute nothing either.
pub(crate) async fn members(cwd: &Path, sink: &dyn DiagnosticSink) -> Vec<RawProject> {
    let manifest_path = cwd.join("Cargo.toml");
    let Ok(contents) = tokio::fs::read_to_string(&manifest_path).await else {
        return Vec::new();
    };
    let doc: DocumentMut = match contents.parse() {
        Ok(doc) => doc,
        Err(err) => {
            report_parse_error(sink, &manifest_path.display().to_string(), &err.to_string());
            return Vec::new();
        }
    };

    let Some(member_paths) = doc
        .get("workspace")
        .and_then(Item::as_table)
        .and_then(|workspace| workspace.get("members"))
        .and_then(Item::as_array)
    else {
        return Vec::new();
    };

    let mut projects = Vec::new();
    for value in member_paths {
        let Some(rel) = value.as_str() else { continue };
        let member_root = cwd.join(rel);
        let member_manifest = member_root.join("Cargo.toml");
        let Ok(member_contents) = tokio::fs::read_to_string(&member_manifest).await else {
            continue;
        };
        let member_doc: DocumentMut = match member_contents.parse() {
            Ok(doc) => doc,
            Err(err) => {
                report_parse_error(sink, &member_manifest.display().to_string(), &err.to_string());
                continue;
            }
        };
        let Some(name) = member_doc
            .get("package")
            .and_then(Item::as_table)
            .and_then(|package| package.get("name"))
            .and_then(Item::as_str)
        else {
            continue;
        };
        projects.push(RawProject {
            name: name.to_string(),
            root: member_root,
        });
    }
    projects
}

fn report_parse_error(sink: &dyn DiagnosticSink, path: &str, err: &str) {
    tracing::warn!(path, err, "malformed Cargo manifest");
    sink.emit(&format!("failed to parse {path}: {err}"));
}
