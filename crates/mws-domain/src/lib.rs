#![deny(clippy::all, warnings)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod classify;
pub mod config;
pub mod descriptor;
mod detect;
pub mod diag;
pub mod scan;

pub use classify::Classifier;
pub use config::{CustomRule, DiscoveryConfig, CONFIG_FILE_NAME};
pub use descriptor::{strip_scope, PackageManager, ProjectDescriptor, SourceKind, ROOT_SENTINEL};
pub use diag::{DiagnosticSink, MemorySink, NullSink};
pub use scan::scan;
