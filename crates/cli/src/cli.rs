use std::path::PathBuf;

use clap::{value_parser, Args, Parser, Subcommand};

use tido_core::model::{FilterCriteria, TaskStatus};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "tido",
    version,
    about = "A small task list with filtering, progress stats, and reordering.",
    after_help = "Examples:\n  tido add \"Buy milk\" --tags errand,food\n  tido list --tag work --status incomplete\n  tido move 3 0\n  tido stats --search report"
)]
pub struct Cli {
    /// Override the data directory (defaults to platform-specific app dir)
    #[arg(long, value_name = "PATH", global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Add a new task
    Add(AddArgs),
    /// List tasks, optionally filtered
    List(ListArgs),
    /// Toggle a task between completed and incomplete
    Toggle(IdArgs),
    /// Replace a task's tags
    Tags(TagsArgs),
    /// Rename a task
    Rename(RenameArgs),
    /// Delete one or more tasks by id
    Delete(DeleteArgs),
    /// Move a task to a new position in the list
    Move(MoveArgs),
    /// Show counts and completion rate, optionally filtered
    Stats(FilterArgs),
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Task title
    #[arg(value_name = "TITLE", required = true)]
    pub title: String,

    /// Free-text tags (e.g. "work, urgent")
    #[arg(long, default_value = "")]
    pub tags: String,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Keep tasks whose title contains this text (case-insensitive)
    #[arg(long)]
    pub search: Option<String>,

    /// Keep tasks with exactly this status
    #[arg(long, value_enum)]
    pub status: Option<TaskStatus>,

    /// Keep tasks whose tags contain this text (case-insensitive)
    #[arg(long)]
    pub tag: Option<String>,
}

impl FilterArgs {
    pub fn to_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            search: self.search.clone().unwrap_or_default(),
            status: self.status,
            tag: self.tag.clone().unwrap_or_default(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Emit the filtered list as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct IdArgs {
    /// Task id
    #[arg(value_name = "ID", required = true)]
    pub id: String,
}

#[derive(Args, Debug, Clone)]
pub struct TagsArgs {
    /// Task id
    #[arg(value_name = "ID", required = true)]
    pub id: String,

    /// New tags text
    #[arg(value_name = "TAGS", required = true)]
    pub tags: String,
}

#[derive(Args, Debug, Clone)]
pub struct RenameArgs {
    /// Task id
    #[arg(value_name = "ID", required = true)]
    pub id: String,

    /// New title
    #[arg(value_name = "TITLE", required = true)]
    pub title: String,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    /// One or more task ids to delete
    #[arg(value_name = "ID", required = true)]
    pub ids: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct MoveArgs {
    /// Task id
    #[arg(value_name = "ID", required = true)]
    pub id: String,

    /// Target position, 0-based
    #[arg(value_name = "POSITION", value_parser = value_parser!(usize))]
    pub position: usize,
}
