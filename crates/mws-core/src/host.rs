use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A folder attached to the host's multi-root workspace. The host owns
/// these; the core only reads snapshots and proposes replacements.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenFolder {
    pub name: String,
    pub path: PathBuf,
}

/// Rejected folder-list update. Propagated to the caller unchanged; the
/// core never retries or swallows host-level mutation failures.
#[derive(thiserror::Error, Debug)]
#[error("workspace folder update rejected: {reason}")]
pub struct HostMutationError {
    pub reason: String,
}

/// The host's folder-list primitive. Every add/remove/rename a
/// reconciliation pass produces is expressed as exactly one
/// `update_folders` splice.
pub trait WorkspaceHost {
    fn open_folders(&self) -> Vec<OpenFolder>;

    /// Atomically replaces `delete_count` folders starting at `start`
    /// with `inserts`.
    fn update_folders(
        &mut self,
        start: usize,
        delete_count: usize,
        inserts: Vec<OpenFolder>,
    ) -> Result<()>;
}

#[derive(Serialize, Deserialize)]
struct RawFolder {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

/// A VS Code-style `.code-workspace` document backing the folder list.
///
/// Keys other than `folders` (settings, extensions, ...) are carried
/// through rewrites untouched. Relative folder paths are resolved against
/// the file's directory on load; saves always write absolute paths.
#[derive(Debug)]
pub struct WorkspaceFile {
    path: PathBuf,
    folders: Vec<OpenFolder>,
    extra: Map<String, Value>,
}

impl WorkspaceFile {
    /// Loads the document at `path`; a missing file means no workspace is
    /// open and yields `None` rather than an error.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let value: Value = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        let Value::Object(mut object) = value else {
            return Err(anyhow!("{} must contain a JSON object", path.display()));
        };
        let folders_value = object
            .remove("folders")
            .unwrap_or_else(|| Value::Array(Vec::new()));
        let raw: Vec<RawFolder> = serde_json::from_value(folders_value)
            .with_context(|| format!("invalid folders entry in {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let folders = raw
            .into_iter()
            .map(|folder| {
                let candidate = PathBuf::from(&folder.path);
                let absolute = if candidate.is_absolute() {
                    candidate
                } else {
                    base.join(candidate)
                };
                let absolute = absolute.canonicalize().unwrap_or(absolute);
                let name = folder.name.unwrap_or_else(|| directory_name(&absolute));
                OpenFolder {
                    name,
                    path: absolute,
                }
            })
            .collect();
        Ok(Some(Self {
            path: path.to_path_buf(),
            folders,
            extra: object,
        }))
    }

    /// Builds a new document in memory; call `save` to write it out.
    pub fn create(path: &Path, folders: Vec<OpenFolder>) -> Self {
        Self {
            path: path.to_path_buf(),
            folders,
            extra: Map::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<()> {
        let folders: Vec<RawFolder> = self
            .folders
            .iter()
            .map(|folder| RawFolder {
                path: folder.path.to_string_lossy().into_owned(),
                name: Some(folder.name.clone()),
            })
            .collect();
        let mut object = self.extra.clone();
        object.insert("folders".to_string(), serde_json::to_value(&folders)?);
        let rendered = serde_json::to_string_pretty(&Value::Object(object))?;
        fs::write(&self.path, rendered)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}

impl WorkspaceHost for WorkspaceFile {
    fn open_folders(&self) -> Vec<OpenFolder> {
        self.folders.clone()
    }

    fn update_folders(
        &mut self,
        start: usize,
        delete_count: usize,
        inserts: Vec<OpenFolder>,
    ) -> Result<()> {
        splice(&mut self.folders, start, delete_count, inserts)?;
        self.save()
    }
}

/// In-memory host, used as a test double for the reconciler.
#[derive(Debug, Default)]
pub struct MemoryHost {
    folders: Vec<OpenFolder>,
    pub mutations: usize,
    pub fail_next: bool,
}

impl MemoryHost {
    pub fn new(folders: Vec<OpenFolder>) -> Self {
        Self {
            folders,
            mutations: 0,
            fail_next: false,
        }
    }
}

impl WorkspaceHost for MemoryHost {
    fn open_folders(&self) -> Vec<OpenFolder> {
        self.folders.clone()
    }

    fn update_folders(
        &mut self,
        start: usize,
        delete_count: usize,
        inserts: Vec<OpenFolder>,
    ) -> Result<()> {
        if self.fail_next {
            self.fail_next = false;
            return Err(HostMutationError {
                reason: "injected failure".to_string(),
            }
            .into());
        }
        splice(&mut self.folders, start, delete_count, inserts)?;
        self.mutations += 1;
        Ok(())
    }
}

fn splice(
    folders: &mut Vec<OpenFolder>,
    start: usize,
    delete_count: usize,
    inserts: Vec<OpenFolder>,
) -> Result<()> {
    let end = start.checked_add(delete_count).filter(|end| *end <= folders.len());
    let Some(end) = end else {
        return Err(HostMutationError {
            reason: format!(
                "splice {start}+{delete_count} out of bounds for {} folders",
                folders.len()
            ),
        }
        .into());
    };
    folders.splice(start..end, inserts);
    Ok(())
}

fn directory_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn load_missing_file_is_not_an_error() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let loaded = WorkspaceFile::load(&tmp.path().join("absent.code-workspace"))
            .expect("load");
        assert!(loaded.is_none());
    }

    #[test]
    fn round_trip_preserves_foreign_keys() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let folder_dir = tmp.path().join("app");
        fs::create_dir_all(&folder_dir).expect("dir");
        let path = tmp.path().join("mono.code-workspace");
        fs::write(
            &path,
            json!({
                "folders": [{ "path": "app" }],
                "settings": { "editor.formatOnSave": true }
            })
            .to_string(),
        )
        .expect("write");

        let mut file = WorkspaceFile::load(&path).expect("load").expect("present");
        let folders = file.open_folders();
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].name, "app");
        assert!(folders[0].path.is_absolute());

        file.update_folders(1, 0, vec![OpenFolder {
            name: "extra".to_string(),
            path: tmp.path().join("extra"),
        }])
        .expect("update");

        let reread: Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("reread")).expect("json");
        assert_eq!(reread["settings"]["editor.formatOnSave"], true);
        assert_eq!(reread["folders"].as_array().expect("folders").len(), 2);
    }

    #[test]
    fn splice_out_of_bounds_is_a_host_mutation_error() {
        let mut host = MemoryHost::new(Vec::new());
        let err = host
            .update_folders(1, 0, Vec::new())
            .expect_err("out of bounds");
        assert!(err.downcast_ref::<HostMutationError>().is_some());
    }

    #[test]
    fn memory_host_counts_mutations_and_propagates_failures() {
        let mut host = MemoryHost::new(Vec::new());
        host.update_folders(0, 0, vec![OpenFolder {
            name: "a".to_string(),
            path: PathBuf::from("/a"),
        }])
        .expect("insert");
        assert_eq!(host.mutations, 1);
        assert_eq!(host.open_folders().len(), 1);

        host.fail_next = true;
        assert!(host.update_folders(0, 1, Vec::new()).is_err());
        assert_eq!(host.open_folders().len(), 1, "failed mutation changes nothing");
    }
}
