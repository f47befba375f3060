use budget_domain::{Category, CategoryGroup};

use crate::cli::core::{parse_group, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "category",
        "Manage categories and their budget groups",
        "category <list|add <name> [group]|rename <name> <new name>|group <name> <group>|remove <name>|replace <name[:group]>...>",
        cmd_category,
    )]
}

fn cmd_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(action) = args.first() else {
        return list_categories(context);
    };

    match action.to_lowercase().as_str() {
        "list" | "ls" => list_categories(context),
        "add" => {
            let name = args.get(1).ok_or_else(|| {
                CommandError::InvalidArguments("usage: category add <name> [group]".into())
            })?;
            let group = match args.get(2) {
                Some(value) => parse_group(value)?,
                None => CategoryGroup::default(),
            };
            context.session.add_category(name, group)?;
            io::print_success(format!("Category `{}` added to {}.", name.trim(), group));
            Ok(())
        }
        "rename" => {
            let (Some(current), Some(new_name)) = (args.get(1), args.get(2)) else {
                return Err(CommandError::InvalidArguments(
                    "usage: category rename <name> <new name>".into(),
                ));
            };
            let touched = context.session.rename_category(current, new_name)?;
            io::print_success(format!(
                "Category renamed to `{}`; {} record(s) updated.",
                new_name.trim(),
                touched
            ));
            Ok(())
        }
        "group" => {
            let (Some(name), Some(group)) = (args.get(1), args.get(2)) else {
                return Err(CommandError::InvalidArguments(
                    "usage: category group <name> <Income|Needs|Wants|Savings>".into(),
                ));
            };
            let group = parse_group(group)?;
            context.session.set_category_group(name, group)?;
            io::print_success(format!("Category `{}` moved to {}.", name, group));
            Ok(())
        }
        "remove" | "rm" => {
            let name = args.get(1).ok_or_else(|| {
                CommandError::InvalidArguments("usage: category remove <name>".into())
            })?;
            let remapped = context.session.remove_category(name)?;
            io::print_success(format!("Category `{}` removed.", name));
            if remapped > 0 {
                io::print_info(format!("{} record(s) are now uncategorized.", remapped));
            }
            Ok(())
        }
        "replace" => {
            if args.len() < 2 {
                return Err(CommandError::InvalidArguments(
                    "usage: category replace <name[:group]>...".into(),
                ));
            }
            let categories = args[1..]
                .iter()
                .map(|spec| parse_category_spec(spec))
                .collect::<Result<Vec<_>, _>>()?;
            let count = categories.len();
            let remapped = context.session.replace_categories(categories)?;
            io::print_success(format!("Category list replaced with {} entries.", count));
            if remapped > 0 {
                io::print_info(format!("{} record(s) are now uncategorized.", remapped));
            }
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown category subcommand `{}`",
            other
        ))),
    }
}

fn list_categories(context: &mut ShellContext) -> CommandResult {
    output::section("Categories");
    for group in CategoryGroup::ALL {
        let names: Vec<&str> = context
            .session
            .categories_in_group(group)
            .into_iter()
            .map(|category| category.name.as_str())
            .collect();
        if names.is_empty() {
            continue;
        }
        io::print_info(format!("{}: {}", group, names.join(", ")));
    }
    Ok(())
}

/// `Groceries` or `Groceries:Needs`; the group defaults to Needs.
fn parse_category_spec(spec: &str) -> Result<Category, CommandError> {
    match spec.rsplit_once(':') {
        Some((name, group)) => Ok(Category::new(name, parse_group(group)?)),
        None => Ok(Category::new(spec, CategoryGroup::default())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_spec_accepts_an_optional_group() {
        let plain = parse_category_spec("Groceries").unwrap();
        assert_eq!(plain.name, "Groceries");
        assert_eq!(plain.group, CategoryGroup::Needs);

        let grouped = parse_category_spec("Salary:income").unwrap();
        assert_eq!(grouped.name, "Salary");
        assert_eq!(grouped.group, CategoryGroup::Income);

        assert!(parse_category_spec("Pets:treats").is_err());
    }
}
