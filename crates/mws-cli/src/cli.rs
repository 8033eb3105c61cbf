use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

pub const MWS_HELP_TEMPLATE: &str =
    "{before-help}\nUsage:\n    {usage}\n\nGlobal options:\n{options}\n";

pub const MWS_BEFORE_HELP: &str = concat!(
    "mws ",
    env!("CARGO_PKG_VERSION"),
    " – Monorepo Workspace Switcher\n\n",
    "\x1b[1;36mCore workflow\x1b[0m\n",
    "  list             Discover the projects in the open monorepo.\n",
    "  open             Switch the workspace to one project (current or new window).\n",
    "  add              Attach one project as an extra workspace folder.\n",
    "  update           Reconcile all workspace folders with discovery (--replace to drop extras).\n",
    "  select           Pick the exact folder set; manual folders are never lost.\n",
);

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    propagate_version = false,
    disable_help_subcommand = true,
    before_help = MWS_BEFORE_HELP,
    help_template = MWS_HELP_TEMPLATE
)]
#[allow(clippy::struct_excessive_bools)]
pub struct MwsCli {
    #[arg(
        short,
        long,
        help = "Suppress human output (errors still print to stderr)",
        global = true
    )]
    pub quiet: bool,
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Increase logging (-vv reaches trace)",
        global = true
    )]
    pub verbose: u8,
    #[arg(long, help = "Force trace logging regardless of -v/-q", global = true)]
    pub trace: bool,
    #[arg(
        long,
        help = "Emit {status,message,details} JSON envelopes",
        global = true
    )]
    pub json: bool,
    #[arg(long, help = "Disable colored human output", global = true)]
    pub no_color: bool,
    #[arg(
        long,
        value_name = "FILE",
        help = "Read discovery configuration from FILE instead of the workspace root's mws.toml",
        global = true
    )]
    pub config: Option<PathBuf>,
    #[arg(
        long,
        value_name = "FILE",
        help = "Operate on FILE instead of the first .code-workspace in the working directory",
        global = true
    )]
    pub workspace_file: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Discover the projects in the open monorepo
    List,
    /// Switch the workspace to a single project
    Open {
        /// Project name as reported by `mws list`
        name: String,
        /// Write a standalone workspace file instead of replacing the
        /// current folder set
        #[arg(long)]
        new_window: bool,
    },
    /// Attach a project as an additional workspace folder
    Add {
        /// Project name as reported by `mws list`
        name: String,
    },
    /// Reconcile the workspace folders with a fresh discovery pass
    Update {
        /// Drop folders discovery does not report (default keeps them)
        #[arg(long)]
        replace: bool,
    },
    /// Set the exact workspace folder set
    Select {
        /// Project names to keep; with none, prints the picker with
        /// currently open projects pre-selected
        names: Vec<String>,
    },
}
