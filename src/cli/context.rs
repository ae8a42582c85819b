//! Shell state, command dispatch, and CLI error types.

use strsim::levenshtein;
use thiserror::Error;

use crate::{
    cli::{commands, output, registry::CommandRegistry},
    config::{Config, ConfigManager},
    domain::BudgetCategory,
    engine::BudgetEngine,
    errors::EngineError,
    storage::JsonStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<LoopControl, CommandError>;

/// Failure of a single command; the shell reports it and keeps running.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("{0}")]
    Aborted(String),
}

impl From<dialoguer::Error> for CommandError {
    fn from(err: dialoguer::Error) -> Self {
        CommandError::Aborted(err.to_string())
    }
}

/// Failure that terminates the shell itself.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Everything a command handler can reach: the engine, the configuration,
/// and the staged envelope edits awaiting an explicit `budget save`.
pub struct ShellContext {
    pub mode: CliMode,
    pub running: bool,
    pub engine: BudgetEngine<JsonStore>,
    pub config: Config,
    pub budget_draft: Option<Vec<BudgetCategory>>,
    registry: CommandRegistry,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config = ConfigManager::new()?.load()?;
        let store = JsonStore::new()?;
        let engine = BudgetEngine::load_or_seed(store)?;
        Ok(Self {
            mode,
            running: true,
            engine,
            config,
            budget_draft: None,
            registry: commands::default_registry(),
        })
    }

    pub fn is_interactive(&self) -> bool {
        self.mode == CliMode::Interactive
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub fn prompt(&self) -> String {
        if self.budget_draft.is_some() {
            "finsmart (budget*)> ".into()
        } else {
            "finsmart> ".into()
        }
    }

    pub fn dispatch(&mut self, command: &str, args: &[&str]) -> CommandResult {
        let Some(handler) = self.registry.handler(command) else {
            self.suggest_command(command);
            return Ok(LoopControl::Continue);
        };
        handler(self, args)
    }

    pub fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let mut suggestions: Vec<_> = self
            .registry
            .names()
            .map(|key| (levenshtein(key, input), key))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                output::info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub fn report_error(&self, err: CommandError) {
        match err {
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::info("Use `help <command>` for usage details.");
            }
            CommandError::Engine(engine_err) => output::error(engine_err),
            CommandError::Aborted(message) => output::info(message),
        }
    }
}
