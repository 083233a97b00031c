use std::io::Write;

use anyhow::Result;

use crate::cli::{
    AddArgs, CliCommand, DeleteArgs, FilterArgs, IdArgs, ListArgs, MoveArgs, RenameArgs, TagsArgs,
};
use crate::config::AppConfig;
use tido_core::error::StoreError;
use tido_core::model::{Task, TaskPatch};
use tido_core::storage::LocalStore;
use tido_core::Workspace;

/// Run one subcommand against the local store and write a human-readable (or
/// JSON) summary.
pub fn execute<W: Write>(config: &AppConfig, command: CliCommand, mut writer: W) -> Result<()> {
    let mut workspace = Workspace::open(LocalStore::new(config))?;
    match command {
        CliCommand::Add(args) => handle_add(&mut workspace, &args, &mut writer),
        CliCommand::List(args) => handle_list(&mut workspace, &args, &mut writer),
        CliCommand::Toggle(args) => handle_toggle(&mut workspace, &args, &mut writer),
        CliCommand::Tags(args) => handle_tags(&mut workspace, &args, &mut writer),
        CliCommand::Rename(args) => handle_rename(&mut workspace, &args, &mut writer),
        CliCommand::Delete(args) => handle_delete(&mut workspace, &args, &mut writer),
        CliCommand::Move(args) => handle_move(&mut workspace, &args, &mut writer),
        CliCommand::Stats(args) => handle_stats(&mut workspace, &args, &mut writer),
    }
}

type LocalWorkspace = Workspace<LocalStore>;

fn handle_add<W: Write>(workspace: &mut LocalWorkspace, args: &AddArgs, mut writer: W) -> Result<()> {
    let task = workspace.add_task(&args.title, &args.tags)?;
    writeln!(writer, "Added task {}: {}", task.id, task.title)?;
    Ok(())
}

fn handle_list<W: Write>(
    workspace: &mut LocalWorkspace,
    args: &ListArgs,
    mut writer: W,
) -> Result<()> {
    *workspace.criteria_mut() = args.filter.to_criteria();
    let view = workspace.filtered_view();

    if args.json {
        serde_json::to_writer_pretty(&mut writer, &view)?;
        writeln!(writer)?;
        return Ok(());
    }

    if view.is_empty() {
        writeln!(writer, "No tasks match.")?;
        return Ok(());
    }
    for task in &view {
        writeln!(writer, "{}", render_row(task))?;
    }
    Ok(())
}

fn render_row(task: &Task) -> String {
    let mark = if task.status.is_completed() { "x" } else { " " };
    if task.tags.is_empty() {
        format!("[{mark}] {:>4}  {}", task.id, task.title)
    } else {
        format!("[{mark}] {:>4}  {}  ({})", task.id, task.title, task.tags)
    }
}

fn handle_toggle<W: Write>(
    workspace: &mut LocalWorkspace,
    args: &IdArgs,
    mut writer: W,
) -> Result<()> {
    workspace.toggle_status(&args.id)?;
    let status = workspace
        .store()
        .get(&args.id)
        .map(|t| t.status.as_str())
        .unwrap_or("unknown");
    writeln!(writer, "Task {} is now {}", args.id, status)?;
    Ok(())
}

fn handle_tags<W: Write>(
    workspace: &mut LocalWorkspace,
    args: &TagsArgs,
    mut writer: W,
) -> Result<()> {
    workspace.update_task(&args.id, TaskPatch::tags(args.tags.clone()))?;
    writeln!(writer, "Updated tags for task {}", args.id)?;
    Ok(())
}

fn handle_rename<W: Write>(
    workspace: &mut LocalWorkspace,
    args: &RenameArgs,
    mut writer: W,
) -> Result<()> {
    workspace.update_task(&args.id, TaskPatch::title(args.title.clone()))?;
    writeln!(writer, "Renamed task {}", args.id)?;
    Ok(())
}

fn handle_delete<W: Write>(
    workspace: &mut LocalWorkspace,
    args: &DeleteArgs,
    mut writer: W,
) -> Result<()> {
    let mut deleted = 0usize;
    let mut missing = Vec::new();
    for id in &args.ids {
        match workspace.delete_task(id) {
            Ok(()) => deleted += 1,
            Err(StoreError::NotFound(id)) => missing.push(id),
            Err(other) => return Err(other.into()),
        }
    }

    if deleted > 0 {
        writeln!(
            writer,
            "Deleted {} task{}",
            deleted,
            if deleted == 1 { "" } else { "s" }
        )?;
    } else {
        writeln!(writer, "No tasks deleted")?;
    }
    if !missing.is_empty() {
        writeln!(writer, "Not found: {}", missing.join(", "))?;
    }
    Ok(())
}

fn handle_move<W: Write>(
    workspace: &mut LocalWorkspace,
    args: &MoveArgs,
    mut writer: W,
) -> Result<()> {
    workspace.reorder_by_id(&args.id, args.position)?;
    writeln!(writer, "Moved task {} to position {}", args.id, args.position)?;
    Ok(())
}

fn handle_stats<W: Write>(
    workspace: &mut LocalWorkspace,
    args: &FilterArgs,
    mut writer: W,
) -> Result<()> {
    *workspace.criteria_mut() = args.to_criteria();
    let stats = workspace.stats();
    writeln!(writer, "Total:      {}", stats.total)?;
    writeln!(writer, "Completed:  {}", stats.completed)?;
    writeln!(writer, "Pending:    {}", stats.pending)?;
    writeln!(writer, "Completion: {:.1}%", stats.completion_rate)?;
    Ok(())
}
