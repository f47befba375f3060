use uuid::Uuid;

use crate::cli::core::{
    parse_amount, parse_assignments, CommandError, CommandResult, ShellContext,
};
use crate::cli::io;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "due",
        "Handle the recurring payment that is currently due",
        "due [show|confirm [amount] [account] [amount=..] [account=..]|defer|dismiss]",
        cmd_due,
    )]
}

fn cmd_due(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let action = args.first().map(|value| value.to_lowercase());
    match action.as_deref() {
        None | Some("show") => show_due(context),
        Some("confirm") => {
            let id = current_due(context)?;
            let ConfirmArgs { amount, account } = parse_confirm_args(&args[1..])?;
            let account = match account {
                Some(account) => account,
                None => context
                    .session
                    .budget()
                    .accounts
                    .first()
                    .cloned()
                    .ok_or_else(|| {
                        CommandError::Message("add an account before confirming payments".into())
                    })?,
            };
            context.confirm_due(id, &account, amount)
        }
        Some("defer") | Some("later") => {
            let id = current_due(context)?;
            context.defer_due(id)
        }
        Some("dismiss") | Some("close") => {
            if context.due_prompt.take().is_some() {
                io::print_info("Reminder closed.");
            } else {
                io::print_info("No reminder is open.");
            }
            Ok(())
        }
        Some(other) => Err(CommandError::InvalidArguments(format!(
            "unknown due subcommand `{}`",
            other
        ))),
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct ConfirmArgs {
    amount: Option<u64>,
    account: Option<String>,
}

/// Positional `[amount] [account]`, or `amount=..`/`account=..` in any order.
fn parse_confirm_args(args: &[&str]) -> Result<ConfirmArgs, CommandError> {
    let (assigned, positional): (Vec<&str>, Vec<&str>) =
        args.iter().copied().partition(|arg| arg.contains('='));
    if positional.len() > 2 {
        return Err(CommandError::InvalidArguments(
            "usage: due confirm [amount] [account]".into(),
        ));
    }
    let mut parsed = ConfirmArgs {
        amount: positional.first().map(|value| parse_amount(value)).transpose()?,
        account: positional.get(1).map(|value| value.to_string()),
    };
    for (key, value) in parse_assignments(&assigned)? {
        match key.as_str() {
            "amount" => parsed.amount = Some(parse_amount(value)?),
            "account" => parsed.account = Some(value.to_string()),
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown field `{other}` (use amount or account)"
                )))
            }
        }
    }
    Ok(parsed)
}

/// The template on display, or the next due one when no prompt is open.
fn current_due(context: &ShellContext) -> Result<Uuid, CommandError> {
    context
        .due_prompt
        .or_else(|| context.session.due_template().map(|template| template.id))
        .ok_or_else(|| CommandError::Message("No recurring payment is due.".into()))
}

fn show_due(context: &mut ShellContext) -> CommandResult {
    let Ok(id) = current_due(context) else {
        io::print_info("No recurring payment is due.");
        return Ok(());
    };
    let period = context.session.period();
    if let Some(template) = context.session.budget().template(id) {
        io::print_info(format!(
            "Due: {} ({}) in {}, day {}.",
            template.name,
            context.format_magnitude(template.amount),
            template.category,
            template.clamped_day(period)
        ));
    }
    Ok(())
}
