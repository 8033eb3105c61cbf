use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Per-workspace configuration file, looked up next to the workspace root.
pub const CONFIG_FILE_NAME: &str = "mws.toml";

/// Discovery configuration, loaded fresh for every scan and immutable
/// during the pass. The core never reads global state; the host
/// collaborator populates this and hands it in.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Emit a descriptor for the workspace root itself.
    pub include_root: bool,
    /// Strip a leading `@scope/` from npm-style package names.
    pub remove_scope: bool,
    pub folders: FolderRules,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            include_root: true,
            remove_scope: false,
            folders: FolderRules::default(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FolderRules {
    pub prefix: CategoryPrefixes,
    pub regex: CategoryPatterns,
    /// Ordered override rules, checked before the built-in categories.
    pub custom: Vec<CustomRule>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CategoryPrefixes {
    pub root: String,
    pub apps: String,
    pub libs: String,
    pub tools: String,
    pub unknown: String,
}

impl Default for CategoryPrefixes {
    fn default() -> Self {
        Self {
            root: "✨".to_string(),
            apps: "🚀".to_string(),
            libs: "📚".to_string(),
            tools: "🔧".to_string(),
            unknown: String::new(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CategoryPatterns {
    pub apps: String,
    pub libs: String,
    pub tools: String,
}

impl Default for CategoryPatterns {
    fn default() -> Self {
        Self {
            apps: "^apps?".to_string(),
            libs: "^(libs?|packages?)".to_string(),
            tools: "^tools?".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomRule {
    pub regex: String,
    pub prefix: String,
}

impl DiscoveryConfig {
    /// Reads `mws.toml` from the workspace root; a missing file yields the
    /// defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml_edit::de::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))
    }
}
