use std::collections::HashSet;
use std::path::Path;

use glob::Pattern;
use serde::Deserialize;
use serde_json::Value;

use super::RawProject;
use crate::descriptor::PackageManager;
use crate::diag::DiagnosticSink;

/// Result of the generic package-manager workspace probe.
pub(crate) struct NodeWorkspace {
    pub manager: PackageManager,
    /// `name` from the root manifest, when present.
    pub root_name: Option<String>,
    pub members: Vec<RawProject>,
}

#[derive(Deserialize)]
struct PnpmManifest {
    #[serde(default)]
    packages: Vec<String>,
}

/// Generic package-manager workspace detector.
///
/// Member patterns come from `pnpm-workspace.yaml` when it exists,
/// otherwise from the root `package.json` `workspaces` field (plain array
/// or `{packages}` object form). Patterns name directories; a directory
/// only counts as a member if it carries its own `package.json`. `!`
/// patterns exclude matching members.
pub(crate) async fn workspace(cwd: &Path, sink: &dyn DiagnosticSink) -> Option<NodeWorkspace> {
    let package_manifest = cwd.join("package.json");
    let root_package: Option<Value> = match tokio::fs::read_to_string(&package_manifest).await {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(value) => Some(value),
            Err(err) => {
                report_parse_error(sink, &package_manifest.display().to_string(), &err.to_string());
                None
            }
        },
        Err(_) => None,
    };
    let root_name = root_package
        .as_ref()
        .and_then(|package| package.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let pnpm_manifest = cwd.join("pnpm-workspace.yaml");
    let (manager, patterns) = if pnpm_manifest.exists() {
        let contents = tokio::fs::read_to_string(&pnpm_manifest).await.ok()?;
        match serde_yaml::from_str::<PnpmManifest>(&contents) {
            Ok(manifest) => (PackageManager::Pnpm, manifest.packages),
            Err(err) => {
                report_parse_error(sink, &pnpm_manifest.display().to_string(), &err.to_string());
                return None;
            }
        }
    } else {
        let patterns = workspace_patterns(root_package.as_ref()?)?;
        let manager = if cwd.join("yarn.lock").exists() {
            PackageManager::Yarn
        } else {
            PackageManager::Npm
        };
        (manager, patterns)
    };

    let mut include = Vec::new();
    let mut exclude = Vec::new();
    for pattern in &patterns {
        if let Some(negated) = pattern.strip_prefix('!') {
            match Pattern::new(negated) {
                Ok(compiled) => exclude.push(compiled),
                Err(err) => {
                    sink.emit(&format!("invalid workspace exclude pattern {negated:?}: {err}"));
                }
            }
        } else {
            include.push(pattern.as_str());
        }
    }

    let mut seen = HashSet::new();
    let mut members = Vec::new();
    for pattern in include {
        let glob_expr = cwd.join(pattern).join("package.json");
        let paths = match glob::glob(&glob_expr.to_string_lossy()) {
            Ok(paths) => paths,
            Err(err) => {
                sink.emit(&format!("invalid workspace pattern {pattern:?}: {err}"));
                continue;
            }
        };
        for manifest in paths.flatten() {
            let Some(dir) = manifest.parent().map(Path::to_path_buf) else {
                continue;
            };
            if dir == cwd || !seen.insert(dir.clone()) {
                continue;
            }
            let rel = dir
                .strip_prefix(cwd)
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();
            if exclude.iter().any(|compiled| compiled.matches(&rel)) {
                continue;
            }
            let name = member_name(&manifest, &dir, sink).await;
            members.push(RawProject { name, root: dir });
        }
    }

    Some(NodeWorkspace {
        manager,
        root_name,
        members,
    })
}

fn workspace_patterns(package: &Value) -> Option<Vec<String>> {
    let workspaces = package.get("workspaces")?;
    let list = match workspaces {
        Value::Array(items) => items,
        Value::Object(map) => map.get("packages")?.as_array()?,
        _ => return None,
    };
    Some(
        list.iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

async fn member_name(manifest: &Path, dir: &Path, sink: &dyn DiagnosticSink) -> String {
    let fallback = || {
        dir.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    let Ok(contents) = tokio::fs::read_to_string(manifest).await else {
        return fallback();
    };
    match serde_json::from_str::<Value>(&contents) {
        Ok(value) => value
            .get("name")
            .and_then(Value::as_str)
            .map_or_else(fallback, str::to_string),
        Err(err) => {
            report_parse_error(sink, &manifest.display().to_string(), &err.to_string());
            fallback()
        }
    }
}

fn report_parse_error(sink: &dyn DiagnosticSink, path: &str, err: &str) {
    tracing::warn!(path, err, "malformed package manifest");
    sink.emit(&format!("failed to parse {path}: {err}"));
}
