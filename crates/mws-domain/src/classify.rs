use regex::{Regex, RegexBuilder};

use crate::config::DiscoveryConfig;
use crate::descriptor::ROOT_SENTINEL;
use crate::diag::DiagnosticSink;

struct PrefixRule {
    pattern: Regex,
    prefix: String,
}

/// Single-pass prefix classifier over root-relative directories.
///
/// Custom rules are evaluated in declaration order ahead of the built-in
/// `apps`/`libs`/`tools` categories; the first matching rule supplies the
/// prefix. Rules with an empty pattern or prefix are inert, and rules
/// whose pattern fails to compile are reported and skipped so one bad
/// entry cannot take classification down.
pub struct Classifier {
    root_prefix: String,
    unknown_prefix: String,
    rules: Vec<PrefixRule>,
}

impl Classifier {
    pub fn new(config: &DiscoveryConfig, sink: &dyn DiagnosticSink) -> Self {
        let folders = &config.folders;
        let mut rules = Vec::new();

        let custom = folders
            .custom
            .iter()
            .map(|rule| (rule.regex.as_str(), rule.prefix.as_str()));
        let builtin = [
            (folders.regex.apps.as_str(), folders.prefix.apps.as_str()),
            (folders.regex.libs.as_str(), folders.prefix.libs.as_str()),
            (folders.regex.tools.as_str(), folders.prefix.tools.as_str()),
        ];

        for (pattern, prefix) in custom.chain(builtin) {
            if pattern.is_empty() || prefix.is_empty() {
                continue;
            }
            match compile(pattern) {
                Ok(regex) => rules.push(PrefixRule {
                    pattern: regex,
                    prefix: prefix.to_string(),
                }),
                Err(err) => {
                    tracing::warn!(pattern, %err, "skipping invalid folder prefix rule");
                    sink.emit(&format!("skipping invalid folder prefix rule {pattern:?}: {err}"));
                }
            }
        }

        Self {
            root_prefix: folders.prefix.root.clone(),
            unknown_prefix: folders.prefix.unknown.clone(),
            rules,
        }
    }

    /// Prefix for a project at `relative_dir` (root-relative).
    pub fn prefix_for(&self, relative_dir: &str) -> &str {
        if relative_dir.is_empty() || relative_dir == ROOT_SENTINEL {
            return &self.root_prefix;
        }
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(relative_dir))
            .map_or(&self.unknown_prefix, |rule| rule.prefix.as_str())
    }
}

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}
