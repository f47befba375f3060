use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "account",
        "Manage accounts",
        "account <list|add <name>|rename <name> <new name>|remove <name>>",
        cmd_account,
    )]
}

fn cmd_account(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(action) = args.first() else {
        return list_accounts(context);
    };

    match action.to_lowercase().as_str() {
        "list" | "ls" => list_accounts(context),
        "add" => {
            let name = args.get(1).ok_or_else(|| {
                CommandError::InvalidArguments("usage: account add <name>".into())
            })?;
            context.session.add_account(name)?;
            io::print_success(format!("Account `{}` added.", name.trim()));
            Ok(())
        }
        "rename" => {
            let (Some(current), Some(new_name)) = (args.get(1), args.get(2)) else {
                return Err(CommandError::InvalidArguments(
                    "usage: account rename <name> <new name>".into(),
                ));
            };
            let touched = context.session.rename_account(current, new_name)?;
            io::print_success(format!(
                "Account renamed to `{}`; {} transaction(s) updated.",
                new_name.trim(),
                touched
            ));
            Ok(())
        }
        "remove" | "rm" => {
            let name = args.get(1).ok_or_else(|| {
                CommandError::InvalidArguments("usage: account remove <name>".into())
            })?;
            context.session.remove_account(name)?;
            io::print_success(format!("Account `{}` removed.", name));
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown account subcommand `{}`",
            other
        ))),
    }
}

fn list_accounts(context: &mut ShellContext) -> CommandResult {
    output::section("Accounts");
    let budget = context.session.budget();
    if budget.accounts.is_empty() {
        io::print_info("No accounts yet. Use `account add <name>`.");
        return Ok(());
    }
    for account in &budget.accounts {
        let used = budget
            .transactions
            .iter()
            .filter(|txn| &txn.account == account)
            .count();
        io::print_info(format!("  {:<20} {} transaction(s)", account, used));
    }
    Ok(())
}
