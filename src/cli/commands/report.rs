use budget_core::SortKey;
use colored::Colorize;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;

const BAR_WIDTH: u64 = 30;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "summary",
            "Totals, month-over-month comparison and category breakdown",
            "summary",
            cmd_summary,
        ),
        CommandEntry::new(
            "chart",
            "Expense chart of the selected month",
            "chart",
            cmd_chart,
        ),
        CommandEntry::new(
            "sort",
            "Show or toggle the transaction sort order",
            "sort [date|account|category|amount]",
            cmd_sort,
        ),
    ]
}

fn cmd_summary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let period = context.session.period();
    let comparison = context.session.comparison();
    let totals = comparison.current;

    output::section(format!("Summary {}", period));
    io::print_info(format!("  Income   : {}", context.format_magnitude(totals.income)));
    io::print_info(format!("  Needs    : {}", context.format_magnitude(totals.needs)));
    io::print_info(format!("  Wants    : {}", context.format_magnitude(totals.wants)));
    io::print_info(format!("  Savings  : {}", context.format_magnitude(totals.savings)));
    io::print_info(format!("  Expenses : {}", context.format_magnitude(totals.expenses())));
    io::print_info(format!("  Balance  : {}", context.format_amount(totals.balance())));

    if comparison.previous_has_data {
        output::section(format!("Compared with {}", period.previous()));
        io::print_info(format!("  Income   : {}", signed(context, comparison.income_delta())));
        io::print_info(format!("  Expenses : {}", signed(context, comparison.expense_delta())));
        io::print_info(format!("  Balance  : {}", signed(context, comparison.balance_delta())));
    }

    output::section("Expenses by category");
    let breakdown = context.session.breakdown();
    if breakdown.is_empty() {
        io::print_info("No expenses in this period.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = breakdown
        .iter()
        .map(|share| {
            vec![
                share.category.clone(),
                share.group.to_string(),
                context.format_magnitude(share.value),
                format!("{}%", share.percent),
            ]
        })
        .collect();
    output::table(&["Category", "Group", "Amount", "Share"], &rows);
    Ok(())
}

fn signed(context: &ShellContext, delta: i64) -> String {
    let formatted = context.format_amount(delta);
    if delta > 0 {
        format!("+{formatted}")
    } else {
        formatted
    }
}

fn cmd_chart(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let chart = context.session.chart();
    output::section(format!("Expenses {}", context.session.period()));
    if chart.is_empty() || chart.total == 0 {
        io::print_info("No expenses to chart.");
        return Ok(());
    }
    let label_width = chart
        .slices
        .iter()
        .map(|slice| slice.label.chars().count())
        .max()
        .unwrap_or(0);
    for slice in &chart.slices {
        let filled = usize::try_from(slice.value.saturating_mul(BAR_WIDTH) / chart.total).unwrap_or(0);
        let bar = match hex_rgb(slice.color) {
            Some((r, g, b)) => "█".repeat(filled.max(1)).truecolor(r, g, b).to_string(),
            None => "█".repeat(filled.max(1)),
        };
        io::print_info(format!(
            "  {:<width$}  {} {} ({})",
            slice.label,
            bar,
            context.format_magnitude(slice.value),
            slice.color,
            width = label_width
        ));
    }
    io::print_info(format!("  Total: {}", context.format_magnitude(chart.total)));
    Ok(())
}

fn hex_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn cmd_sort(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let state = match args.first() {
        Some(value) => {
            let key: SortKey = value
                .parse()
                .map_err(|err: budget_core::CoreError| {
                    CommandError::InvalidArguments(err.to_string())
                })?;
            context.session.toggle_sort(key)
        }
        None => context.session.sort_state(),
    };
    io::print_info(format!(
        "Transactions sorted by {} {}.",
        state.key,
        state.direction.arrow()
    ));
    Ok(())
}
