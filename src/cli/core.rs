//! Core CLI dispatch, shell context construction and shared argument helpers.

use std::{env, io, path::PathBuf, sync::Arc};

use budget_config::{Config, ConfigManager};
use budget_core::{CurrencyFormatter, DateFormatter, RecurringService, SummaryService};
use budget_domain::{CategoryGroup, YearMonth};
use budget_storage_json::JsonBudgetStorage;
use chrono::NaiveDate;
use dialoguer::theme::ColorfulTheme;
use tracing::debug;
use uuid::Uuid;

pub use crate::core::errors::CliError;
use crate::core::{
    errors::BudgetError,
    session::{BudgetSession, LoadReport},
};

use super::commands;
use super::formatters::CliFormatters;
use super::io as cli_io;
use super::output;
use super::registry::{CommandEntry, CommandRegistry};
pub use super::shell_context::{CliMode, ShellContext};
use super::system_clock::SystemClock;

/// Overrides the directory holding configuration, data and backups.
pub const HOME_ENV: &str = "HOME_BUDGET_HOME";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let home_override = env::var_os(HOME_ENV).map(PathBuf::from);
        let config_base = home_override
            .clone()
            .unwrap_or_else(|| Config::default().resolve_data_root());
        let config_manager = ConfigManager::with_base_dir(config_base)?;
        let config = config_manager.load()?;
        output::set_color_enabled(config.ui_color_enabled);

        let (data_dir, backup_dir) = match &home_override {
            Some(base) => {
                let backups = config
                    .backup_root
                    .clone()
                    .unwrap_or_else(|| base.join("backups"));
                (base.clone(), backups)
            }
            None => (config.resolve_data_root(), config.resolve_backup_root()),
        };
        let storage =
            JsonBudgetStorage::with_retention(data_dir.clone(), backup_dir, config.backup_retention)
                .map_err(BudgetError::from)?;
        let (session, report) = BudgetSession::open(Box::new(storage), Arc::new(SystemClock))?;

        let context = ShellContext {
            mode,
            registry,
            session,
            theme: ColorfulTheme::default(),
            formatters: CliFormatters::from_config(&config),
            config_manager,
            config,
            data_dir,
            due_prompt: None,
            due_checked_at: None,
            last_command: None,
            running: true,
        };
        context.report_load(&report);
        Ok(context)
    }

    pub(crate) fn mode(&self) -> CliMode {
        self.mode
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn prompt(&self) -> String {
        format!("budget {}> ", self.session.period())
    }

    fn report_load(&self, report: &LoadReport) {
        if report.restored {
            debug!(dir = %self.data_dir.display(), "stored budget restored");
        }
        for warning in &report.warnings {
            cli_io::print_warning(warning);
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));
        if let Some(best) = self.registry.closest(input) {
            cli_io::print_info(format!("Suggestion: `{}`?", best));
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit shell?", true).map_err(CliError::from)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(&message);
                cli_io::print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            other => {
                cli_io::print_error(other.to_string());
                Ok(())
            }
        }
    }

    /// Rebuilds everything derived from the configuration after a change.
    pub(crate) fn apply_config(&mut self) -> CommandResult {
        output::set_color_enabled(self.config.ui_color_enabled);
        self.formatters = CliFormatters::from_config(&self.config);
        self.config_manager
            .save(&self.config)
            .map_err(|err| CommandError::Core(err.into()))
    }

    pub(crate) fn format_amount(&self, amount: i64) -> String {
        self.formatters.format_amount(amount)
    }

    pub(crate) fn format_magnitude(&self, amount: u64) -> String {
        self.format_amount(i64::try_from(amount).unwrap_or(i64::MAX))
    }

    pub(crate) fn format_date(&self, date: NaiveDate) -> String {
        self.formatters.format_date(date)
    }

    /// Resolves a transaction by full id or unique short-id prefix.
    pub(crate) fn resolve_transaction(&self, reference: &str) -> Result<Uuid, CommandError> {
        let ids = self.session.budget().transactions.iter().map(|txn| txn.id);
        resolve_id(ids, reference, "transaction")
    }

    /// Resolves a recurring template by id prefix or exact name.
    pub(crate) fn resolve_template(&self, reference: &str) -> Result<Uuid, CommandError> {
        let templates = &self.session.budget().recurring_templates;
        if let Some(template) = templates
            .iter()
            .find(|template| template.name.eq_ignore_ascii_case(reference.trim()))
        {
            return Ok(template.id);
        }
        resolve_id(templates.iter().map(|template| template.id), reference, "template")
    }

    /// Offers the next due recurring payment, at most once per store change.
    pub(crate) fn refresh_due_prompt(&mut self) -> CommandResult {
        let revision = self.session.revision();
        if let Some(id) = self.due_prompt {
            if self.prompt_is_current(id) {
                return Ok(());
            }
            self.due_prompt = None;
        }
        if self.due_checked_at == Some(revision) {
            return Ok(());
        }
        self.due_checked_at = Some(revision);

        let Some(template) = self.session.due_template() else {
            return Ok(());
        };
        let (id, name, amount, day) = (
            template.id,
            template.name.clone(),
            template.amount,
            template.clamped_day(self.session.period()),
        );
        self.due_prompt = Some(id);
        cli_io::print_warning(format!(
            "Recurring payment due: {} ({}) on day {}.",
            name,
            self.format_magnitude(amount),
            day
        ));

        if self.mode == CliMode::Interactive {
            self.resolve_due_interactively(id, amount)
        } else {
            cli_io::print_hint(
                "Use `due confirm [amount] [account]`, `due defer` or `due dismiss`.",
            );
            Ok(())
        }
    }

    fn prompt_is_current(&self, id: Uuid) -> bool {
        let budget = self.session.budget();
        let Some(template) = budget.template(id) else {
            return false;
        };
        let period_transactions = SummaryService::month_transactions(budget, budget.period);
        RecurringService::is_due(
            template,
            budget.period,
            self.session.today(),
            &period_transactions,
            self.session.snoozed(),
        )
    }

    fn resolve_due_interactively(&mut self, id: Uuid, amount: u64) -> CommandResult {
        let choices = vec![
            "Record it now".to_string(),
            "Remind me later".to_string(),
            "Close".to_string(),
        ];
        match cli_io::select_index(&self.theme, "What would you like to do?", &choices)? {
            Some(0) => {
                let accounts = self.session.budget().accounts.clone();
                let Some(index) = cli_io::select_index(&self.theme, "Account", &accounts)? else {
                    return Ok(());
                };
                let raw = cli_io::prompt_text(&self.theme, "Amount", &amount.to_string())?;
                let amount = parse_amount(&raw)?;
                self.confirm_due(id, &accounts[index], Some(amount))
            }
            Some(1) => self.defer_due(id),
            _ => {
                self.due_prompt = None;
                Ok(())
            }
        }
    }

    pub(crate) fn confirm_due(
        &mut self,
        id: Uuid,
        account: &str,
        amount: Option<u64>,
    ) -> CommandResult {
        let txn_id = self.session.confirm_recurring(id, account, amount)?;
        self.due_prompt = None;
        cli_io::print_success(format!("Recurring payment recorded ({}).", short_id(txn_id)));
        Ok(())
    }

    pub(crate) fn defer_due(&mut self, id: Uuid) -> CommandResult {
        self.session.defer_recurring(id)?;
        self.due_prompt = None;
        cli_io::print_info("Reminder postponed until the next session.");
        Ok(())
    }
}

fn resolve_id(
    ids: impl Iterator<Item = Uuid>,
    reference: &str,
    kind: &str,
) -> Result<Uuid, CommandError> {
    let needle = reference.trim().to_ascii_lowercase().replace('-', "");
    if needle.is_empty() {
        return Err(CommandError::InvalidArguments(format!("{kind} id is required")));
    }
    let matches: Vec<Uuid> = ids
        .filter(|id| id.simple().to_string().starts_with(&needle))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(CommandError::InvalidArguments(format!(
            "no {kind} matches `{reference}`"
        ))),
        _ => Err(CommandError::InvalidArguments(format!(
            "`{reference}` matches several {kind}s; use more characters"
        ))),
    }
}

pub(crate) fn short_id(id: Uuid) -> String {
    let mut short = id.simple().to_string();
    short.truncate(8);
    short
}

/// Parses a whole, positive amount in minor units. Spaces and underscores
/// may be used as digit separators.
pub(crate) fn parse_amount(input: &str) -> Result<u64, CommandError> {
    let cleaned: String = input
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '_')
        .collect();
    let amount: u64 = cleaned.parse().map_err(|_| {
        CommandError::InvalidArguments(format!("invalid amount `{}` (use a whole number)", input))
    })?;
    if amount == 0 {
        return Err(CommandError::InvalidArguments(
            "amount must be greater than zero".into(),
        ));
    }
    Ok(amount)
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{}` (use YYYY-MM-DD)", input))
    })
}

pub(crate) fn parse_period(input: &str) -> Result<YearMonth, CommandError> {
    input
        .parse::<YearMonth>()
        .map_err(|err| CommandError::InvalidArguments(format!("invalid period `{input}`: {err}")))
}

pub(crate) fn parse_group(input: &str) -> Result<CategoryGroup, CommandError> {
    input
        .parse::<CategoryGroup>()
        .map_err(|err| CommandError::InvalidArguments(err.to_string()))
}

pub(crate) fn parse_day(input: &str) -> Result<u32, CommandError> {
    input
        .parse::<u32>()
        .ok()
        .filter(|day| (1..=31).contains(day))
        .ok_or_else(|| CommandError::InvalidArguments(format!("invalid day `{input}` (1-31)")))
}

/// Splits `key=value` pairs used by edit subcommands.
pub(crate) fn parse_assignments<'a>(
    args: &[&'a str],
) -> Result<Vec<(String, &'a str)>, CommandError> {
    args.iter()
        .map(|arg| {
            arg.split_once('=')
                .map(|(key, value)| (key.trim().to_lowercase(), value))
                .ok_or_else(|| {
                    CommandError::InvalidArguments(format!("expected key=value, got `{arg}`"))
                })
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] BudgetError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<rustyline::error::ReadlineError> for CliError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        CliError::Command(err.to_string())
    }
}
