use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use mws_domain::ProjectDescriptor;

use crate::host::{OpenFolder, WorkspaceHost};

/// One folder-list splice, the only mutation shape the host accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderMutation {
    pub start: usize,
    pub delete_count: usize,
    pub inserts: Vec<OpenFolder>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpdateMode {
    /// Keep open folders the selection does not mention (set union).
    #[default]
    Merge,
    /// The final set is exactly the selection.
    Replace,
}

pub fn descriptor_folder(descriptor: &ProjectDescriptor) -> OpenFolder {
    OpenFolder {
        name: descriptor.label(),
        path: descriptor.root.clone(),
    }
}

/// Plans adding a single folder. Idempotent: already present under the
/// same name plans nothing; present under a different name is replaced in
/// place (first path match wins) so it picks up the new display name at
/// the same position; otherwise the folder is appended.
pub fn plan_add_folder(current: &[OpenFolder], folder: &OpenFolder) -> Option<FolderMutation> {
    for (index, existing) in current.iter().enumerate() {
        if existing.path == folder.path {
            if existing.name == folder.name {
                return None;
            }
            return Some(FolderMutation {
                start: index,
                delete_count: 1,
                inserts: vec![folder.clone()],
            });
        }
    }
    Some(FolderMutation {
        start: current.len(),
        delete_count: 0,
        inserts: vec![folder.clone()],
    })
}

/// Plans reconciling the whole folder list against `selected`.
///
/// Merge mode keeps currently open folders whose path (exact equality) is
/// not in the selection, ahead of the selection; Replace mode drops them.
/// When the desired list already equals the current one the plan is
/// `None`, so a second identical call never mutates the host.
pub fn plan_update_all(
    current: &[OpenFolder],
    selected: &[OpenFolder],
    mode: UpdateMode,
) -> Option<FolderMutation> {
    let selected_paths: HashSet<&Path> = selected.iter().map(|f| f.path.as_path()).collect();
    let mut desired = Vec::with_capacity(current.len() + selected.len());
    if mode == UpdateMode::Merge {
        desired.extend(
            current
                .iter()
                .filter(|folder| !selected_paths.contains(folder.path.as_path()))
                .cloned(),
        );
    }
    desired.extend(selected.iter().cloned());

    if desired == current {
        return None;
    }
    Some(FolderMutation {
        start: 0,
        delete_count: current.len(),
        inserts: desired,
    })
}

/// Applies a plan as the single splice the host contract requires.
/// Returns whether anything changed; host failures propagate untouched.
pub fn apply(host: &mut dyn WorkspaceHost, plan: Option<FolderMutation>) -> Result<bool> {
    match plan {
        Some(mutation) => {
            host.update_folders(mutation.start, mutation.delete_count, mutation.inserts)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// One row of the interactive picker model.
#[derive(Clone, Debug, Serialize)]
pub struct SelectionItem {
    pub name: String,
    pub label: String,
    pub description: String,
    pub root: PathBuf,
    /// Pre-selected because the folder is already open.
    pub picked: bool,
    /// False for folders the scan did not report (added manually to the
    /// workspace); they are carried so the picker never loses them.
    pub discovered: bool,
}

impl SelectionItem {
    pub fn folder(&self) -> OpenFolder {
        OpenFolder {
            name: self.label.clone(),
            path: self.root.clone(),
        }
    }
}

/// Builds the picker model: discovered descriptors, pre-picked when
/// already open, followed by synthetic rows for open folders discovery
/// missed. Confirming a subset feeds `plan_update_all(..., Replace)`.
pub fn selection_plan(
    descriptors: &[ProjectDescriptor],
    current: &[OpenFolder],
) -> Vec<SelectionItem> {
    let open: HashSet<&Path> = current.iter().map(|f| f.path.as_path()).collect();
    let known: HashSet<&Path> = descriptors.iter().map(|d| d.root.as_path()).collect();

    let mut items: Vec<SelectionItem> = descriptors
        .iter()
        .map(|descriptor| SelectionItem {
            name: descriptor.name.clone(),
            label: descriptor.label(),
            description: descriptor.description.clone(),
            root: descriptor.root.clone(),
            picked: open.contains(descriptor.root.as_path()),
            discovered: true,
        })
        .collect();

    for folder in current {
        if known.contains(folder.path.as_path()) {
            continue;
        }
        items.push(SelectionItem {
            name: folder.name.clone(),
            label: folder.name.clone(),
            description: String::new(),
            root: folder.path.clone(),
            picked: true,
            discovered: false,
        });
    }

    items
}
