use std::{
    borrow::Cow,
    fmt,
    io::{self, BufRead},
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use budget_config::model::CONFIG_KEYS;
use budget_core::SortKey;
use budget_domain::CategoryGroup;
use shell_words::split;
use tracing::debug;

use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::io as cli_io;
use crate::cli::output::info as output_info;

/// Selects line-by-line script mode reading commands from stdin.
pub const SCRIPT_ENV: &str = "HOME_BUDGET_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;
    announce_due(&mut context)?;

    let outcome = match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    };
    debug!(status = %context.status(), "shell stopped");
    outcome
}

fn announce_due(context: &mut ShellContext) -> Result<(), CliError> {
    if let Err(err) = context.refresh_due_prompt() {
        context.report_error(err)?;
    }
    Ok(())
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
    let helper = CommandHelper::new(context.command_names(), Vocabulary::from_context(context));
    editor.set_helper(Some(helper));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

    loop {
        if !context.running {
            break;
        }
        let prompt = context.prompt();
        let line = editor.readline(&prompt);

        match line {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                editor.add_history_entry(trimmed).ok();

                match handle_line(context, trimmed) {
                    Ok(LoopControl::Continue) => announce_due(context)?,
                    Ok(LoopControl::Exit) => break,
                    Err(err) => {
                        context.report_error(err)?;
                        announce_due(context)?;
                    }
                }
                if let Some(helper) = editor.helper_mut() {
                    helper.vocabulary = Vocabulary::from_context(context);
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                output_info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if !context.running {
            break;
        }
        let line = line?;
        match handle_line(context, &line) {
            Ok(LoopControl::Continue) => announce_due(context)?,
            Ok(LoopControl::Exit) => break,
            Err(err) => {
                context.report_error(err)?;
                announce_due(context)?;
            }
        }
    }
    Ok(())
}

fn handle_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
    let tokens = match parse_command_line(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            cli_io::print_warning(&err.message);
            return Ok(LoopControl::Continue);
        }
    };

    if tokens.is_empty() {
        return Ok(LoopControl::Continue);
    }

    let raw = &tokens[0];
    let command = raw.to_lowercase();
    let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();

    context.last_command = Some(line.trim().to_string());

    match context.dispatch(&command, raw, &args) {
        Ok(LoopControl::Exit) => {
            context.running = false;
            Ok(LoopControl::Exit)
        }
        other => other,
    }
}

/// Names known to the shell, refreshed after every command so completion
/// follows categories and accounts added during the session.
#[derive(Debug, Default)]
struct Vocabulary {
    categories: Vec<String>,
    accounts: Vec<String>,
}

impl Vocabulary {
    fn from_context(context: &ShellContext) -> Self {
        let budget = context.session.budget();
        Self {
            categories: budget.categories.iter().map(|c| c.name.clone()).collect(),
            accounts: budget.accounts.clone(),
        }
    }
}

struct CommandHelper {
    commands: Vec<String>,
    vocabulary: Vocabulary,
}

impl CommandHelper {
    fn new(names: Vec<&'static str>, vocabulary: Vocabulary) -> Self {
        let mut commands: Vec<String> = names
            .into_iter()
            .map(|name| name.to_ascii_lowercase())
            .collect();
        commands.sort();
        commands.dedup();
        Self {
            commands,
            vocabulary,
        }
    }

    /// Candidates for the word at index `words.len()`, given the finished
    /// words before it.
    fn candidates(&self, words: &[String], partial: &str) -> Vec<String> {
        if let Some((key, _)) = partial.split_once('=') {
            let values = match key {
                "account" => &self.vocabulary.accounts,
                "category" => &self.vocabulary.categories,
                _ => return Vec::new(),
            };
            return values.iter().map(|value| format!("{key}={value}")).collect();
        }

        let lowered: Vec<String> = words.iter().map(|word| word.to_lowercase()).collect();
        let lowered: Vec<&str> = lowered.iter().map(String::as_str).collect();
        match lowered.as_slice() {
            [] => self.commands.clone(),
            ["help"] => self.commands.clone(),
            ["sort"] => SortKey::ALL.iter().map(|key| key.as_str().to_string()).collect(),
            [command] => subcommands(command).iter().map(|s| s.to_string()).collect(),
            ["tx", "add"] | ["recurring", "add", _] => self.vocabulary.categories.clone(),
            ["category", "rename" | "group" | "remove" | "rm"] => {
                self.vocabulary.categories.clone()
            }
            ["category", "group", _] | ["category", "add", _] => CategoryGroup::ALL
                .iter()
                .map(|group| group.to_string())
                .collect(),
            ["account", "rename" | "remove" | "rm"] => self.vocabulary.accounts.clone(),
            ["due", "confirm", _] => self.vocabulary.accounts.clone(),
            ["config", "set"] => CONFIG_KEYS.iter().map(|key| key.to_string()).collect(),
            _ => Vec::new(),
        }
    }

    fn complete_prefix(&self, prefix: &str) -> (usize, Vec<Pair>) {
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let words = parse_command_line(&prefix[..start]).unwrap_or_default();
        let partial = prefix[start..].trim_start_matches(|ch| ch == '"' || ch == '\'');
        let needle = partial.to_lowercase();

        let candidates = self
            .candidates(&words, partial)
            .into_iter()
            .filter(|candidate| candidate.to_lowercase().starts_with(&needle))
            .map(|candidate| Pair {
                replacement: quote_if_needed(&candidate),
                display: candidate,
            })
            .collect();
        (start, candidates)
    }
}

fn subcommands(command: &str) -> &'static [&'static str] {
    match command {
        "tx" => &["list", "add", "edit", "remove", "suggest"],
        "category" => &["list", "add", "rename", "group", "remove", "replace"],
        "account" => &["list", "add", "rename", "remove"],
        "recurring" => &["list", "add", "edit", "remove", "pause", "resume"],
        "due" => &["show", "confirm", "defer", "dismiss"],
        "period" => &["show", "set", "next", "prev", "shift"],
        "config" => &["show", "set"],
        _ => &[],
    }
}

/// Wraps names containing whitespace in quotes so the tokenizer keeps them whole.
fn quote_if_needed(value: &str) -> String {
    match value.split_once('=') {
        Some((key, rest)) if rest.contains(char::is_whitespace) => format!("{key}=\"{rest}\""),
        None if value.contains(char::is_whitespace) => format!("\"{value}\""),
        _ => value.to_string(),
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(self.complete_prefix(&line[..pos]))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for CommandHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        let _ = ctx;
        Ok(ValidationResult::Valid(None))
    }
}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    split(input).map_err(|err| ParseError {
        message: err.to_string(),
    })
}

#[derive(Debug)]
pub(crate) struct ParseError {
    message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
