//! Detection strategies, one per manifest convention.
//!
//! Each detector probes the workspace root independently and yields raw
//! `(name, root)` pairs, or nothing when its convention is absent.
//! Filesystem errors degrade to an empty contribution; malformed manifest
//! content is reported to the diagnostic sink because it points at a real
//! authoring error, but never aborts the other strategies.

use std::path::PathBuf;

pub(crate) mod cargo;
pub(crate) mod node;
pub(crate) mod nx;

#[derive(Clone, Debug)]
pub(crate) struct RawProject {
    pub name: String,
    pub root: PathBuf,
}
