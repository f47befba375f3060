//! Shared runtime state for CLI interactions and command execution.

use std::path::PathBuf;

use budget_config::{Config, ConfigManager};
use dialoguer::theme::ColorfulTheme;
use uuid::Uuid;

use crate::core::session::BudgetSession;

use super::{formatters::CliFormatters, registry::CommandRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub session: BudgetSession,
    pub theme: ColorfulTheme,
    pub formatters: CliFormatters,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub data_dir: PathBuf,
    /// Template currently offered for confirmation.
    pub due_prompt: Option<Uuid>,
    /// Session revision at which due templates were last evaluated.
    pub due_checked_at: Option<u64>,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn status(&self) -> String {
        format!(
            "ShellContext {{ running: {}, last_command: {:?}, period: {}, due_prompt: {:?} }}",
            self.running,
            self.last_command,
            self.session.period(),
            self.due_prompt
        )
    }
}
