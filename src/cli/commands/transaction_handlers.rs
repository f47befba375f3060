use budget_domain::{Transaction, TransactionPatch};

use crate::cli::core::{
    parse_amount, parse_assignments, parse_date, short_id, CommandError, CommandResult,
    ShellContext,
};
use crate::cli::io;
use crate::cli::output;

pub(super) fn handle_list(context: &mut ShellContext) -> CommandResult {
    let period = context.session.period();
    let sort = context.session.sort_state();
    let budget = context.session.budget();
    let rows: Vec<Vec<String>> = context
        .session
        .period_transactions()
        .into_iter()
        .map(|txn| {
            vec![
                short_id(txn.id),
                context.format_date(txn.date),
                txn.account.clone(),
                txn.category.clone(),
                txn.description.clone(),
                context.format_amount(budget.signed_amount(txn)),
            ]
        })
        .collect();

    output::section(format!(
        "Transactions {} (by {} {})",
        period,
        sort.key,
        sort.direction.arrow()
    ));
    if rows.is_empty() {
        io::print_info(format!("No transactions in {}.", period));
        return Ok(());
    }
    output::table(
        &["ID", "Date", "Account", "Category", "Description", "Amount"],
        &rows,
    );
    Ok(())
}

pub(super) fn handle_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 2 {
        return Err(CommandError::InvalidArguments(
            "usage: tx add <category> <amount> [account=..] [date=YYYY-MM-DD] [description=..]"
                .into(),
        ));
    }
    let category = args[0];
    let amount = parse_amount(args[1])?;
    let mut account = default_account(context);
    let mut date = context.session.default_date();
    let mut description = String::new();
    for (key, value) in parse_assignments(&args[2..])? {
        match key.as_str() {
            "account" => account = value.to_string(),
            "date" => date = parse_date(value)?,
            "description" | "desc" => description = value.to_string(),
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown transaction field `{other}`"
                )))
            }
        }
    }

    let transaction =
        Transaction::new(date, account, category, amount).with_description(description);
    let id = context.session.add_transaction(transaction)?;
    io::print_success(format!("Transaction {} added.", short_id(id)));
    Ok(())
}

pub(super) fn run_add_wizard(context: &mut ShellContext) -> CommandResult {
    let categories: Vec<String> = context
        .session
        .budget()
        .categories
        .iter()
        .map(|category| format!("{} ({})", category.name, category.group))
        .collect();
    let Some(category_idx) = io::select_index(&context.theme, "Category", &categories)? else {
        io::print_info("Operation cancelled.");
        return Ok(());
    };
    let category = context.session.budget().categories[category_idx].name.clone();

    let amount = parse_amount(&io::prompt_text(&context.theme, "Amount", "")?)?;

    let accounts = context.session.budget().accounts.clone();
    let Some(account_idx) = io::select_index(&context.theme, "Account", &accounts)? else {
        io::print_info("Operation cancelled.");
        return Ok(());
    };

    let default_date = context.session.default_date().format("%Y-%m-%d").to_string();
    let date = parse_date(&io::prompt_text(&context.theme, "Date", &default_date)?)?;

    let description = io::prompt_text(&context.theme, "Description", "")?;
    for suggestion in context.session.suggest_descriptions(&description) {
        if suggestion != description.trim() {
            io::print_hint(format!("also used: {suggestion}"));
        }
    }

    let transaction = Transaction::new(date, accounts[account_idx].clone(), category, amount)
        .with_description(description);
    let id = context.session.add_transaction(transaction)?;
    io::print_success(format!("Transaction {} added.", short_id(id)));
    Ok(())
}

pub(super) fn handle_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((reference, assignments)) = args.split_first() else {
        return Err(CommandError::InvalidArguments(
            "usage: tx edit <id> key=value..".into(),
        ));
    };
    let id = context.resolve_transaction(reference)?;

    let mut patch = TransactionPatch::default();
    for (key, value) in parse_assignments(assignments)? {
        match key.as_str() {
            "date" => patch.date = Some(parse_date(value)?),
            "account" => patch.account = Some(value.to_string()),
            "category" => patch.category = Some(value.to_string()),
            "description" | "desc" => patch.description = Some(value.to_string()),
            "amount" => patch.amount = Some(parse_amount(value)?),
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown transaction field `{other}`"
                )))
            }
        }
    }
    if patch.is_empty() {
        return Err(CommandError::InvalidArguments(
            "nothing to change; pass at least one key=value".into(),
        ));
    }

    context.session.update_transaction(id, &patch)?;
    io::print_success(format!("Transaction {} updated.", short_id(id)));
    Ok(())
}

pub(super) fn handle_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let reference = args.first().ok_or_else(|| {
        CommandError::InvalidArguments("usage: tx remove <id>".into())
    })?;
    let id = context.resolve_transaction(reference)?;
    let removed = context.session.remove_transaction(id)?;
    io::print_success(format!(
        "Transaction {} removed ({}, {}).",
        short_id(removed.id),
        removed.category,
        context.format_magnitude(removed.amount)
    ));
    Ok(())
}

pub(super) fn handle_suggest(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let query = args.join(" ");
    let suggestions = context.session.suggest_descriptions(&query);
    if suggestions.is_empty() {
        io::print_info("No matching descriptions.");
        return Ok(());
    }
    for suggestion in suggestions {
        io::print_info(format!("  {suggestion}"));
    }
    Ok(())
}

fn default_account(context: &ShellContext) -> String {
    context
        .session
        .budget()
        .accounts
        .first()
        .cloned()
        .unwrap_or_default()
}
