pub mod account;
pub mod category;
pub mod config;
pub mod due;
pub mod period;
pub mod recurring;
pub mod report;
pub mod system;
pub mod transaction;
mod transaction_handlers;
pub mod transfer;

use crate::cli::registry::{CommandEntry, CommandRegistry};

/// Order in which root commands are listed by `help`.
pub(crate) const ROOT_COMMAND_ORDER: &[&str] = &[
    "period",
    "tx",
    "category",
    "account",
    "recurring",
    "due",
    "summary",
    "chart",
    "sort",
    "export",
    "import",
    "config",
    "version",
    "help",
    "exit",
];

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    let mut definitions: Vec<CommandEntry> = Vec::new();
    definitions.extend(period::definitions());
    definitions.extend(transaction::definitions());
    definitions.extend(category::definitions());
    definitions.extend(account::definitions());
    definitions.extend(recurring::definitions());
    definitions.extend(due::definitions());
    definitions.extend(report::definitions());
    definitions.extend(transfer::definitions());
    definitions.extend(config::definitions());
    definitions.extend(system::definitions());

    definitions.sort_by_key(|entry| {
        ROOT_COMMAND_ORDER
            .iter()
            .position(|name| *name == entry.name)
            .unwrap_or(ROOT_COMMAND_ORDER.len())
    });
    for entry in definitions {
        registry.register(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_command_is_registered_in_order() {
        let mut registry = CommandRegistry::new();
        register_all(&mut registry);
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, ROOT_COMMAND_ORDER);
    }

    #[test]
    fn close_typos_get_a_suggestion() {
        let mut registry = CommandRegistry::new();
        register_all(&mut registry);
        assert_eq!(registry.closest("sumary"), Some("summary"));
        assert_eq!(registry.closest("recuring"), Some("recurring"));
        assert_eq!(registry.closest("zzzzzzzzzz"), None);
    }
}
