use super::transaction_handlers as handlers;
use crate::cli::core::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "tx",
        "List and record transactions of the selected month",
        "tx <list|add <category> <amount> [account=..] [date=..] [description=..]|edit <id> key=value..|remove <id>|suggest <text>>",
        cmd_tx,
    )]
}

fn cmd_tx(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(action) = args.first() else {
        return handlers::handle_list(context);
    };
    let rest = &args[1..];

    match action.to_lowercase().as_str() {
        "list" | "ls" => handlers::handle_list(context),
        "add" => {
            if context.mode() == CliMode::Interactive && rest.is_empty() {
                handlers::run_add_wizard(context)
            } else {
                handlers::handle_add(context, rest)
            }
        }
        "edit" => handlers::handle_edit(context, rest),
        "remove" | "rm" => handlers::handle_remove(context, rest),
        "suggest" => handlers::handle_suggest(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown tx subcommand `{}`",
            other
        ))),
    }
}
