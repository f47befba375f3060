use crate::cli::core::{parse_period, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "period",
        "Show or change the selected month",
        "period [show|set <YYYY-MM>|next|prev|shift <months>]",
        cmd_period,
    )]
}

fn cmd_period(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(action) = args.first() else {
        return show_period(context);
    };

    match action.to_lowercase().as_str() {
        "show" => show_period(context),
        "set" => {
            let value = args.get(1).ok_or_else(|| {
                CommandError::InvalidArguments("usage: period set <YYYY-MM>".into())
            })?;
            let period = parse_period(value)?;
            context.session.set_period(period)?;
            show_period(context)
        }
        "next" => shift(context, 1),
        "prev" | "previous" => shift(context, -1),
        "shift" => {
            let delta = args
                .get(1)
                .and_then(|value| value.parse::<i32>().ok())
                .ok_or_else(|| {
                    CommandError::InvalidArguments("usage: period shift <months>".into())
                })?;
            shift(context, delta)
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown period subcommand `{}`",
            other
        ))),
    }
}

fn shift(context: &mut ShellContext, delta: i32) -> CommandResult {
    context.session.shift_period(delta)?;
    show_period(context)
}

fn show_period(context: &mut ShellContext) -> CommandResult {
    let period = context.session.period();
    let count = context.session.period_transactions().len();
    io::print_info(format!(
        "Period {} ({} - {}), {} transaction(s).",
        period,
        context.format_date(period.first_day()),
        context.format_date(period.last_day()),
        count
    ));
    Ok(())
}
