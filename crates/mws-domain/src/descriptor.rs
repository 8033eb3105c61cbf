use std::path::PathBuf;

use serde::Serialize;

/// Sort/dedup key of the workspace root entry. Must order before every
/// member path.
pub const ROOT_SENTINEL: &str = "/";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
}

impl PackageManager {
    pub fn as_str(self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
        }
    }

    /// Capitalized form used in the root entry description.
    pub fn title(self) -> &'static str {
        match self {
            PackageManager::Npm => "Npm",
            PackageManager::Yarn => "Yarn",
            PackageManager::Pnpm => "Pnpm",
        }
    }
}

/// Which detection strategy produced a descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceKind {
    Workspace { manager: PackageManager },
    Nx,
    Cargo,
}

impl SourceKind {
    fn suffix(self) -> String {
        match self {
            SourceKind::Workspace { manager } => format!("{} workspace", manager.as_str()),
            SourceKind::Nx => "NX".to_string(),
            SourceKind::Cargo => "Cargo".to_string(),
        }
    }
}

/// One discoverable sub-project, normalized across manifest conventions.
///
/// Descriptors are created fresh on every scan and consumed by the
/// reconciliation step; nothing caches them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProjectDescriptor {
    pub name: String,
    pub root: PathBuf,
    /// Root-relative path; `"/"` for the root itself. Unique within a
    /// merged scan result.
    pub relative_root: String,
    pub source: SourceKind,
    pub is_root: bool,
    /// Classification prefix (usually an emoji), may be empty.
    pub prefix: String,
    /// Human context: `"at <rel>"` for members, `"<Kind> Workspace Root"`
    /// for the root entry.
    pub description: String,
}

impl ProjectDescriptor {
    /// Display label: prefix, name, and a source annotation for members.
    pub fn label(&self) -> String {
        let base = if self.is_root {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.source.suffix())
        };
        if self.prefix.is_empty() {
            base
        } else {
            format!("{} {}", self.prefix, base)
        }
    }
}

/// Strips a leading `@scope/` from an npm-style package name.
pub fn strip_scope(name: &str) -> &str {
    name.strip_prefix('@')
        .and_then(|rest| rest.split_once('/'))
        .map_or(name, |(_, tail)| tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_includes_prefix_and_suffix() {
        let descriptor = ProjectDescriptor {
            name: "api".to_string(),
            root: PathBuf::from("/repo/apps/api"),
            relative_root: "apps/api".to_string(),
            source: SourceKind::Workspace {
                manager: PackageManager::Npm,
            },
            is_root: false,
            prefix: "🚀".to_string(),
            description: "at apps/api".to_string(),
        };
        assert_eq!(descriptor.label(), "🚀 api (npm workspace)");
    }

    #[test]
    fn root_label_has_no_source_suffix() {
        let descriptor = ProjectDescriptor {
            name: "monorepo".to_string(),
            root: PathBuf::from("/repo"),
            relative_root: ROOT_SENTINEL.to_string(),
            source: SourceKind::Workspace {
                manager: PackageManager::Yarn,
            },
            is_root: true,
            prefix: String::new(),
            description: "Yarn Workspace Root".to_string(),
        };
        assert_eq!(descriptor.label(), "monorepo");
    }

    #[test]
    fn strip_scope_only_touches_scoped_names() {
        assert_eq!(strip_scope("@acme/api"), "api");
        assert_eq!(strip_scope("api"), "api");
        assert_eq!(strip_scope("@malformed"), "@malformed");
    }
}
