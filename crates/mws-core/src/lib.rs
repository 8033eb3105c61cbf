#![deny(clippy::all, warnings)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

mod context;
mod host;
mod ops;
mod outcome;
mod reconcile;

pub use context::{CommandContext, GlobalOptions, TracingSink};
pub use host::{HostMutationError, MemoryHost, OpenFolder, WorkspaceFile, WorkspaceHost};
pub use ops::{execute, MwsCommand};
pub use outcome::{format_status_message, to_json_response, CommandStatus, ExecutionOutcome};
pub use reconcile::{
    apply, descriptor_folder, plan_add_folder, plan_update_all, selection_plan, FolderMutation,
    SelectionItem, UpdateMode,
};
