use budget_domain::{RecurringTemplate, RecurringTemplatePatch};

use crate::cli::core::{
    parse_amount, parse_assignments, parse_day, short_id, CommandError, CommandResult,
    ShellContext,
};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "recurring",
        "Manage recurring payment templates",
        "recurring <list|add <name> <category> <amount> [day]|edit <ref> key=value..|remove <ref>|pause <ref>|resume <ref>>",
        cmd_recurring,
    )]
}

fn cmd_recurring(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(action) = args.first() else {
        return list_templates(context);
    };
    let rest = &args[1..];

    match action.to_lowercase().as_str() {
        "list" | "ls" => list_templates(context),
        "add" => add_template(context, rest),
        "edit" => edit_template(context, rest),
        "remove" | "rm" => {
            let id = context.resolve_template(required_ref(rest, "remove")?)?;
            let removed = context.session.remove_template(id)?;
            io::print_success(format!("Template `{}` removed.", removed.name));
            Ok(())
        }
        "pause" => set_active(context, rest, false),
        "resume" => set_active(context, rest, true),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown recurring subcommand `{}`",
            other
        ))),
    }
}

fn required_ref<'a>(args: &[&'a str], action: &str) -> Result<&'a str, CommandError> {
    args.first().copied().ok_or_else(|| {
        CommandError::InvalidArguments(format!("usage: recurring {action} <id|name>"))
    })
}

fn add_template(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 3 {
        return Err(CommandError::InvalidArguments(
            "usage: recurring add <name> <category> <amount> [day]".into(),
        ));
    }
    let amount = parse_amount(args[2])?;
    let day = match args.get(3) {
        Some(value) => parse_day(value)?,
        None => RecurringTemplate::default_day(),
    };
    let template = RecurringTemplate::new(args[0].trim(), args[1], amount, day);
    let id = context.session.add_template(template)?;
    io::print_success(format!("Template {} added.", short_id(id)));
    Ok(())
}

fn edit_template(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((reference, assignments)) = args.split_first() else {
        return Err(CommandError::InvalidArguments(
            "usage: recurring edit <id|name> key=value..".into(),
        ));
    };
    let id = context.resolve_template(reference)?;

    let mut patch = RecurringTemplatePatch::default();
    for (key, value) in parse_assignments(assignments)? {
        match key.as_str() {
            "name" => patch.name = Some(value.trim().to_string()),
            "category" => patch.category = Some(value.to_string()),
            "amount" => patch.amount = Some(parse_amount(value)?),
            "day" => patch.day = Some(parse_day(value)?),
            "active" => {
                patch.active = Some(match value.to_ascii_lowercase().as_str() {
                    "true" | "yes" | "on" => true,
                    "false" | "no" | "off" => false,
                    _ => {
                        return Err(CommandError::InvalidArguments(format!(
                            "invalid active flag `{value}` (use on/off)"
                        )))
                    }
                })
            }
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown template field `{other}`"
                )))
            }
        }
    }

    context.session.update_template(id, &patch)?;
    io::print_success(format!("Template {} updated.", short_id(id)));
    Ok(())
}

fn set_active(context: &mut ShellContext, args: &[&str], active: bool) -> CommandResult {
    let action = if active { "resume" } else { "pause" };
    let id = context.resolve_template(required_ref(args, action)?)?;
    let patch = RecurringTemplatePatch {
        active: Some(active),
        ..RecurringTemplatePatch::default()
    };
    context.session.update_template(id, &patch)?;
    let state = if active { "resumed" } else { "paused" };
    io::print_success(format!("Template {} {}.", short_id(id), state));
    Ok(())
}

fn list_templates(context: &mut ShellContext) -> CommandResult {
    output::section("Recurring payments");
    let templates = &context.session.budget().recurring_templates;
    if templates.is_empty() {
        io::print_info("No recurring payments defined.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = templates
        .iter()
        .map(|template| {
            vec![
                short_id(template.id),
                template.name.clone(),
                template.category.clone(),
                context.format_magnitude(template.amount),
                template.day.to_string(),
                if template.active { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    output::table(&["ID", "Name", "Category", "Amount", "Day", "Active"], &rows);
    io::print_info(format!(
        "Active monthly total: {}",
        context.format_magnitude(context.session.recurring_monthly_total())
    ));
    Ok(())
}
