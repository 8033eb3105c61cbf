use std::path::Path;

use anyhow::Result;
use indexmap::IndexMap;

use crate::classify::Classifier;
use crate::config::DiscoveryConfig;
use crate::descriptor::{strip_scope, ProjectDescriptor, SourceKind, ROOT_SENTINEL};
use crate::detect::{self, RawProject};
use crate::diag::DiagnosticSink;

/// Discovers the projects under `cwd`.
///
/// The three detectors are fanned out concurrently and joined before the
/// merge; their results are concatenated in fixed order (generic
/// workspace, Nx, Cargo) so that when two detectors report the same root
/// the first occurrence wins. The merged list is deduplicated on
/// `relative_root` and sorted with the root entry pinned first, which
/// keeps the output deterministic for a fixed filesystem snapshot no
/// matter how detector execution interleaves.
pub async fn scan(
    cwd: &Path,
    config: &DiscoveryConfig,
    sink: &dyn DiagnosticSink,
) -> Result<Vec<ProjectDescriptor>> {
    let root = cwd.canonicalize().unwrap_or_else(|_| cwd.to_path_buf());
    let classifier = Classifier::new(config, sink);

    let (node, nx, cargo) = tokio::join!(
        detect::node::workspace(&root, sink),
        detect::nx::projects(&root, sink),
        detect::cargo::members(&root, sink),
    );

    let mut merged: IndexMap<String, ProjectDescriptor> = IndexMap::new();

    if let Some(workspace) = node {
        if config.include_root {
            let name = workspace
                .root_name
                .as_deref()
                .map_or_else(|| "root".to_string(), |name| display_name(name, config));
            let descriptor = ProjectDescriptor {
                name,
                root: root.clone(),
                relative_root: ROOT_SENTINEL.to_string(),
                source: SourceKind::Workspace {
                    manager: workspace.manager,
                },
                is_root: true,
                prefix: classifier.prefix_for(ROOT_SENTINEL).to_string(),
                description: format!("{} Workspace Root", workspace.manager.title()),
            };
            merged.insert(ROOT_SENTINEL.to_string(), descriptor);
        }
        let source = SourceKind::Workspace {
            manager: workspace.manager,
        };
        for raw in workspace.members {
            push_member(&mut merged, &root, raw, source, config, &classifier);
        }
    }
    for raw in nx {
        push_member(&mut merged, &root, raw, SourceKind::Nx, config, &classifier);
    }
    for raw in cargo {
        push_member(&mut merged, &root, raw, SourceKind::Cargo, config, &classifier);
    }

    let mut out: Vec<ProjectDescriptor> = merged.into_values().collect();
    out.sort_by(|a, b| {
        (!a.is_root)
            .cmp(&!b.is_root)
            .then_with(|| a.relative_root.cmp(&b.relative_root))
    });

    tracing::debug!(projects = out.len(), root = %root.display(), "scan complete");
    sink.emit(&format!(
        "found {} projects under {}",
        out.len(),
        root.display()
    ));
    Ok(out)
}

fn push_member(
    merged: &mut IndexMap<String, ProjectDescriptor>,
    root: &Path,
    raw: RawProject,
    source: SourceKind,
    config: &DiscoveryConfig,
    classifier: &Classifier,
) {
    let canonical = raw.root.canonicalize().unwrap_or(raw.root);
    let relative_root = relative_root_of(root, &canonical);
    if merged.contains_key(&relative_root) {
        return;
    }
    let descriptor = ProjectDescriptor {
        name: display_name(&raw.name, config),
        root: canonical,
        prefix: classifier.prefix_for(&relative_root).to_string(),
        description: format!("at {relative_root}"),
        relative_root: relative_root.clone(),
        source,
        is_root: false,
    };
    merged.insert(relative_root, descriptor);
}

/// Root-relative dedup/sort key; a member that resolves to the root
/// itself collapses onto the root sentinel.
fn relative_root_of(root: &Path, member: &Path) -> String {
    match member.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ROOT_SENTINEL.to_string(),
        Ok(rel) => rel.to_string_lossy().into_owned(),
        Err(_) => member.to_string_lossy().into_owned(),
    }
}

fn display_name(name: &str, config: &DiscoveryConfig) -> String {
    if config.remove_scope {
        strip_scope(name).to_string()
    } else {
        name.to_string()
    }
}
