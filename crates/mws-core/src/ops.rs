use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Value};

use mws_domain::{scan, ProjectDescriptor};

use crate::context::{CommandContext, GlobalOptions, TracingSink};
use crate::host::{OpenFolder, WorkspaceFile, WorkspaceHost};
use crate::outcome::ExecutionOutcome;
use crate::reconcile::{self, SelectionItem, UpdateMode};

const NO_WORKSPACE_MESSAGE: &str = "no workspace open";

/// The five host actions plus listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MwsCommand {
    List,
    Open { name: String, new_window: bool },
    Add { name: String },
    Update { replace: bool },
    Select { names: Vec<String> },
}

impl MwsCommand {
    pub fn name(&self) -> &'static str {
        match self {
            MwsCommand::List => "list",
            MwsCommand::Open { .. } => "open",
            MwsCommand::Add { .. } => "add",
            MwsCommand::Update { .. } => "update",
            MwsCommand::Select { .. } => "select",
        }
    }
}

/// Entry point for the CLI: one user action per call, run to completion
/// on a private current-thread runtime.
pub fn execute(global: &GlobalOptions, command: &MwsCommand) -> Result<ExecutionOutcome> {
    let ctx = CommandContext::new(global, Arc::new(TracingSink));
    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    runtime.block_on(dispatch(&ctx, command))
}

async fn dispatch(ctx: &CommandContext<'_>, command: &MwsCommand) -> Result<ExecutionOutcome> {
    match command {
        MwsCommand::List => list(ctx).await,
        MwsCommand::Open { name, new_window } => open(ctx, name, *new_window).await,
        MwsCommand::Add { name } => add(ctx, name).await,
        MwsCommand::Update { replace } => update(ctx, *replace).await,
        MwsCommand::Select { names } => select(ctx, names).await,
    }
}

struct Scanned {
    file: WorkspaceFile,
    current: Vec<OpenFolder>,
    root: PathBuf,
    projects: Vec<ProjectDescriptor>,
}

/// Snapshot of the open workspace plus a fresh discovery pass rooted at
/// its first folder. `None` means no workspace is open.
async fn scan_current(ctx: &CommandContext<'_>) -> Result<Option<Scanned>> {
    let Some(file) = ctx.workspace_file()? else {
        return Ok(None);
    };
    let current = file.open_folders();
    let Some(first) = current.first() else {
        return Ok(None);
    };
    let root = first.path.clone();
    let config = ctx.discovery_config(&root)?;
    let projects = scan(&root, &config, ctx.sink()).await?;
    Ok(Some(Scanned {
        file,
        current,
        root,
        projects,
    }))
}

async fn list(ctx: &CommandContext<'_>) -> Result<ExecutionOutcome> {
    let Some(scanned) = scan_current(ctx).await? else {
        return Ok(ExecutionOutcome::noop(NO_WORKSPACE_MESSAGE));
    };
    let details = json!({
        "workspace": {
            "root": scanned.root.display().to_string(),
            "file": scanned.file.path().display().to_string(),
        },
        "projects": scanned.projects.iter().map(project_json).collect::<Vec<_>>(),
    });
    Ok(ExecutionOutcome::success(
        format!("found {} projects", scanned.projects.len()),
        details,
    ))
}

async fn open(ctx: &CommandContext<'_>, name: &str, new_window: bool) -> Result<ExecutionOutcome> {
    let Some(mut scanned) = scan_current(ctx).await? else {
        return Ok(ExecutionOutcome::noop(NO_WORKSPACE_MESSAGE));
    };
    let Some(descriptor) = find_descriptor(&scanned.projects, name) else {
        return Ok(unknown_project(name, &scanned.projects));
    };
    let folder = reconcile::descriptor_folder(descriptor);
    let display = descriptor.name.clone();

    if new_window {
        let target = scanned
            .file
            .path()
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(format!("{}.code-workspace", file_stem(&display)));
        // The open workspace file carries settings and other keys the
        // host owns; a standalone file must never replace it.
        if target == scanned.file.path() {
            return Ok(ExecutionOutcome::user_error(
                format!(
                    "refusing to overwrite the open workspace file {}",
                    target.display()
                ),
                json!({
                    "workspace_file": target.display().to_string(),
                    "hint": "use `mws open` without --new-window to switch in place",
                }),
            ));
        }
        let fresh = WorkspaceFile::create(&target, vec![folder]);
        fresh.save()?;
        return Ok(ExecutionOutcome::success(
            format!("prepared workspace for {display}"),
            json!({ "workspace_file": target.display().to_string() }),
        ));
    }

    let plan = reconcile::plan_update_all(&scanned.current, &[folder], UpdateMode::Replace);
    let changed = reconcile::apply(&mut scanned.file, plan)?;
    Ok(ExecutionOutcome::success(
        format!("opened {display} in current window"),
        json!({ "changed": changed }),
    ))
}

async fn add(ctx: &CommandContext<'_>, name: &str) -> Result<ExecutionOutcome> {
    let Some(mut scanned) = scan_current(ctx).await? else {
        return Ok(ExecutionOutcome::noop(NO_WORKSPACE_MESSAGE));
    };
    let Some(descriptor) = find_descriptor(&scanned.projects, name) else {
        return Ok(unknown_project(name, &scanned.projects));
    };
    let folder = reconcile::descriptor_folder(descriptor);
    let display = descriptor.name.clone();

    let plan = reconcile::plan_add_folder(&scanned.current, &folder);
    let changed = reconcile::apply(&mut scanned.file, plan)?;
    let message = if changed {
        format!("added {display} as workspace folder")
    } else {
        format!("{display} is already a workspace folder")
    };
    Ok(ExecutionOutcome::success(message, json!({ "changed": changed })))
}

async fn update(ctx: &CommandContext<'_>, replace: bool) -> Result<ExecutionOutcome> {
    let Some(mut scanned) = scan_current(ctx).await? else {
        return Ok(ExecutionOutcome::noop(NO_WORKSPACE_MESSAGE));
    };
    let mode = if replace {
        UpdateMode::Replace
    } else {
        UpdateMode::Merge
    };
    let selected: Vec<OpenFolder> = scanned
        .projects
        .iter()
        .map(reconcile::descriptor_folder)
        .collect();
    let plan = reconcile::plan_update_all(&scanned.current, &selected, mode);
    let changed = reconcile::apply(&mut scanned.file, plan)?;

    let message = if changed {
        "workspace folders updated"
    } else {
        "workspace folders already up to date"
    };
    Ok(ExecutionOutcome::success(message, json!({
        "changed": changed,
        "folders": folders_json(&scanned.file.open_folders()),
    })))
}

async fn select(ctx: &CommandContext<'_>, names: &[String]) -> Result<ExecutionOutcome> {
    let Some(mut scanned) = scan_current(ctx).await? else {
        return Ok(ExecutionOutcome::noop(NO_WORKSPACE_MESSAGE));
    };
    let items = reconcile::selection_plan(&scanned.projects, &scanned.current);

    if names.is_empty() {
        return Ok(ExecutionOutcome::success(
            format!("{} projects available", items.len()),
            json!({ "items": items }),
        ));
    }

    let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
    let chosen: Vec<&SelectionItem> = items
        .iter()
        .filter(|item| wanted.contains(item.name.as_str()) || wanted.contains(item.label.as_str()))
        .collect();
    for name in names {
        let known = chosen
            .iter()
            .any(|item| item.name == *name || item.label == *name);
        if !known {
            return Ok(ExecutionOutcome::user_error(
                format!("unknown project {name}"),
                json!({
                    "unknown": name,
                    "available": items.iter().map(|item| item.name.clone()).collect::<Vec<_>>(),
                    "hint": "run `mws select` with no arguments to see the picker",
                }),
            ));
        }
    }

    let selected: Vec<OpenFolder> = chosen.iter().map(|item| item.folder()).collect();
    let plan = reconcile::plan_update_all(&scanned.current, &selected, UpdateMode::Replace);
    let changed = reconcile::apply(&mut scanned.file, plan)?;
    Ok(ExecutionOutcome::success(
        format!("workspace folders set to {} projects", selected.len()),
        json!({
            "changed": changed,
            "folders": folders_json(&scanned.file.open_folders()),
        }),
    ))
}

fn find_descriptor<'a>(
    projects: &'a [ProjectDescriptor],
    name: &str,
) -> Option<&'a ProjectDescriptor> {
    projects
        .iter()
        .find(|descriptor| descriptor.name == name)
        .or_else(|| projects.iter().find(|descriptor| descriptor.label() == name))
}

fn unknown_project(name: &str, projects: &[ProjectDescriptor]) -> ExecutionOutcome {
    ExecutionOutcome::user_error(
        format!("unknown project {name}"),
        json!({
            "unknown": name,
            "available": projects.iter().map(|d| d.name.clone()).collect::<Vec<_>>(),
            "hint": "run `mws list` to see discovered projects",
        }),
    )
}

fn project_json(descriptor: &ProjectDescriptor) -> Value {
    json!({
        "name": descriptor.name,
        "label": descriptor.label(),
        "root": descriptor.root.display().to_string(),
        "relative_root": descriptor.relative_root,
        "source": descriptor.source,
        "is_root": descriptor.is_root,
        "prefix": descriptor.prefix,
        "description": descriptor.description,
    })
}

fn folders_json(folders: &[OpenFolder]) -> Value {
    json!(folders
        .iter()
        .map(|folder| json!({
            "name": folder.name,
            "path": folder.path.display().to_string(),
        }))
        .collect::<Vec<_>>())
}

/// Project names can contain path separators (`@scope/pkg`); flatten them
/// before using the name as a file stem.
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect()
}
