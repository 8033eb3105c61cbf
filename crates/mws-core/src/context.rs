use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mws_domain::{DiagnosticSink, DiscoveryConfig};

use crate::host::WorkspaceFile;

/// Flags shared by every command, populated by the CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalOptions {
    pub quiet: bool,
    pub verbose: u8,
    pub trace: bool,
    pub json: bool,
    /// Explicit `mws.toml` path; defaults to the workspace root's copy.
    pub config: Option<String>,
    /// Explicit `.code-workspace` path; defaults to the first one found
    /// in the working directory.
    pub workspace_file: Option<String>,
}

/// Forwards discovery diagnostics into the `tracing` pipeline.
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, line: &str) {
        tracing::info!(target: "mws", "{line}");
    }
}

pub struct CommandContext<'a> {
    pub global: &'a GlobalOptions,
    sink: Arc<dyn DiagnosticSink>,
}

impl<'a> CommandContext<'a> {
    pub fn new(global: &'a GlobalOptions, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { global, sink }
    }

    pub fn sink(&self) -> &dyn DiagnosticSink {
        self.sink.as_ref()
    }

    /// Locates and loads the workspace file. `None` means no workspace is
    /// open, which every operation treats as "nothing to do".
    pub fn workspace_file(&self) -> Result<Option<WorkspaceFile>> {
        let path = match &self.global.workspace_file {
            Some(explicit) => Some(PathBuf::from(explicit)),
            None => find_workspace_file()?,
        };
        match path {
            Some(path) => WorkspaceFile::load(&path),
            None => Ok(None),
        }
    }

    /// Reads the discovery configuration, fresh for this invocation.
    pub fn discovery_config(&self, root: &Path) -> Result<DiscoveryConfig> {
        match &self.global.config {
            Some(explicit) => DiscoveryConfig::load_from(Path::new(explicit)),
            None => DiscoveryConfig::load(root),
        }
    }
}

/// First `.code-workspace` file in the working directory, by name, so the
/// choice is stable across runs.
fn find_workspace_file() -> Result<Option<PathBuf>> {
    let cwd = std::env::current_dir().context("unable to determine working directory")?;
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(&cwd)
        .with_context(|| format!("failed to list {}", cwd.display()))?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .is_some_and(|extension| extension == "code-workspace")
        })
        .collect();
    candidates.sort();
    Ok(candidates.into_iter().next())
}
