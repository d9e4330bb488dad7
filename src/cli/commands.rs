use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mf", about = concat!("mindflow v", env!("CARGO_PKG_VERSION"), " - dump tasks, tag projects, focus on now"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use the .mindflow/ directory under this root instead of discovering one
    #[arg(short = 'C', long = "dir", global = true)]
    pub dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a .mindflow/ directory here
    Init(InitArgs),
    /// Capture a task; #tags file it into projects
    Add(AddArgs),
    /// Show inbox, projects and the now-list
    List(ListArgs),
    /// Show the inbox
    Inbox(ListArgs),
    /// Show projects in order
    Projects(ProjectsArgs),
    /// Show the now-list grouped by origin
    Now(ListArgs),
    /// Show every copy of a task
    Show(IdArgs),
    /// Move a task into the now-list
    Focus(FocusArgs),
    /// Replace a task's text (re-reads its tags, resets completion)
    Edit(EditArgs),
    /// Delete a task everywhere
    Rm(IdArgs),
    /// Toggle completion
    Done(DoneArgs),
    /// Dissolve a project, returning its tasks to the inbox
    Drop(DropArgs),
    /// Move a project to another project's position
    Reorder(ReorderArgs),
    /// Show or change the notes
    Notes(NotesArgs),
    /// Replace all state with a browser local-storage export
    Import(ImportArgs),
    /// View or prune the recovery log
    Recovery(RecoveryArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Rewrite config.toml if .mindflow/ already exists (data is kept)
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task text, e.g. `buy milk #groceries`
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Hide completed tasks (overrides config)
    #[arg(long)]
    pub open: bool,
}

#[derive(Args)]
pub struct ProjectsArgs {
    /// Show a single project
    pub name: Option<String>,
    /// Hide completed tasks (overrides config)
    #[arg(long)]
    pub open: bool,
}

#[derive(Args)]
pub struct IdArgs {
    /// Task id (or a unique suffix of it)
    pub id: String,
}

#[derive(Args)]
pub struct FocusArgs {
    /// Task id (or a unique suffix of it)
    pub id: String,
    /// Project to take the task from (default: inbox)
    #[arg(long)]
    pub from: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task id (or a unique suffix of it)
    pub id: String,
    /// New text including any #tags
    #[arg(num_args = 0..)]
    pub text: Vec<String>,
}

#[derive(Args)]
pub struct DoneArgs {
    /// Task id (or a unique suffix of it)
    pub id: String,
    /// Toggle only the copy in this location: inbox, now, or a project name
    #[arg(long = "in")]
    pub location: Option<String>,
}

#[derive(Args)]
pub struct DropArgs {
    /// Project name (with or without #)
    pub name: String,
}

#[derive(Args)]
pub struct ReorderArgs {
    /// Project to move
    pub project: String,
    /// Project whose position it takes
    pub target: String,
}

#[derive(Args)]
pub struct NotesArgs {
    /// New notes text (omit to print the notes)
    #[arg(num_args = 0..)]
    pub text: Vec<String>,
    /// Append a line instead of replacing
    #[arg(long)]
    pub append: bool,
    /// Clear the notes
    #[arg(long, conflicts_with_all = ["append", "text"])]
    pub clear: bool,
}

#[derive(Args)]
pub struct ImportArgs {
    /// JSON file with the mindflow_* local-storage keys
    pub file: String,
}

#[derive(Args)]
pub struct RecoveryArgs {
    /// Maximum number of entries to show
    #[arg(long, default_value = "10")]
    pub limit: usize,
    /// Remove entries older than 30 days
    #[arg(long)]
    pub prune: bool,
}
