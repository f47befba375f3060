use std::path::PathBuf;

use budget_core::TransferService;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "export",
            "Write the whole budget to a JSON file",
            "export [path]",
            cmd_export,
        ),
        CommandEntry::new(
            "import",
            "Replace budget sections from a JSON file",
            "import <path>",
            cmd_import,
        ),
    ]
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = match args.first() {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(TransferService::export_file_name(context.session.period())),
    };
    context.session.export_to_path(&path)?;
    io::print_success(format!("Budget exported to {}.", path.display()));
    Ok(())
}

fn cmd_import(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = args
        .first()
        .map(PathBuf::from)
        .ok_or_else(|| CommandError::InvalidArguments("usage: import <path>".into()))?;
    let summary = context.session.import_from_path(&path)?;
    context.due_prompt = None;
    io::print_success(format!("Import finished: {}.", summary));
    Ok(())
}
