use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fl", about = concat!("flowlog v", env!("CARGO_PKG_VERSION"), " - tasks, progress and a timeline in your terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Capture a task in the inbox
    Add(AddArgs),
    /// List tasks by section
    List(ListArgs),
    /// Show task details
    Show(IdArg),
    /// Start a task (inbox -> ongoing, starting today)
    Start(IdArg),
    /// Mark a task done
    Done(IdArg),
    /// Move a completed task back to ongoing
    Restore(IdArg),
    /// Archive a task
    Archive(IdArg),
    /// Set manual progress (0-100)
    Progress(ProgressArgs),
    /// Turn subtask-driven progress on or off
    Auto(AutoArgs),
    /// Manage subtasks
    Sub(SubCmd),
    /// Edit task fields
    Set(SetArgs),
    /// Permanently delete a task
    Delete(IdArg),
    /// Print the timeline window
    Timeline,
    /// Show or set the color theme
    Theme(ThemeArgs),
    /// Read or change config.toml
    Config(ConfigCmd),
    /// View or prune the recovery log
    Recovery(RecoveryCmd),
}

// ---------------------------------------------------------------------------
// Task args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct IdArg {
    /// Task ID
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Planned end date (YYYY-MM-DD, today, tomorrow, in 3d, in 2w)
    #[arg(long)]
    pub end: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Section: inbox, ongoing, completed, archived or all (default: open tasks)
    pub section: Option<String>,
}

#[derive(Args)]
pub struct ProgressArgs {
    /// Task ID
    pub id: String,
    /// Percent complete; values outside 0-100 are clamped
    #[arg(allow_hyphen_values = true)]
    pub value: i64,
}

#[derive(Args)]
pub struct AutoArgs {
    /// Task ID
    pub id: String,
    /// on or off
    pub mode: String,
}

#[derive(Args)]
pub struct SetArgs {
    /// Task ID
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long = "desc")]
    pub description: Option<String>,
    /// Start date
    #[arg(long)]
    pub start: Option<String>,
    /// Planned end date
    #[arg(long)]
    pub end: Option<String>,
    /// Hard deadline
    #[arg(long, conflicts_with = "clear_deadline")]
    pub deadline: Option<String>,
    /// Remove the hard deadline
    #[arg(long)]
    pub clear_deadline: bool,
}

// ---------------------------------------------------------------------------
// Subtasks
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SubCmd {
    #[command(subcommand)]
    pub action: SubAction,
}

#[derive(Subcommand)]
pub enum SubAction {
    /// Add a subtask
    Add(SubAddArgs),
    /// Check or uncheck a subtask
    Toggle(SubRefArgs),
    /// Remove a subtask
    Rm(SubRefArgs),
}

#[derive(Args)]
pub struct SubAddArgs {
    /// Parent task ID
    pub id: String,
    /// Subtask text
    pub text: String,
}

#[derive(Args)]
pub struct SubRefArgs {
    /// Parent task ID
    pub id: String,
    /// Subtask ID (e.g. T-003.2) or its number (2)
    pub sub: String,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ThemeArgs {
    /// light or dark (omit to print the current theme)
    pub theme: Option<String>,
}

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print a value (dotted key, e.g. timeline.day_width)
    Get(ConfigGetArgs),
    /// Set a value, keeping the rest of the file as written
    Set(ConfigSetArgs),
    /// Print the path to config.toml
    Path,
}

#[derive(Args)]
pub struct ConfigGetArgs {
    pub key: String,
}

#[derive(Args)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RecoveryCmd {
    #[command(subcommand)]
    pub action: Option<RecoveryAction>,
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum RecoveryAction {
    /// Remove old entries
    Prune(RecoveryPruneArgs),
    /// Print the absolute path to the recovery log
    Path,
}

#[derive(Args)]
pub struct RecoveryPruneArgs {
    /// Remove all entries instead of those older than 30 days
    #[arg(long)]
    pub all: bool,
}
