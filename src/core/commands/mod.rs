use std::collections::BTreeMap;
use std::env;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

mod cd;
mod cdh;
mod exit;
mod filesearch;
mod take;

pub use cd::CdCommand;
pub use cdh::CdhCommand;
pub use exit::ExitCommand;
pub use filesearch::FileSearchCommand;
pub use take::TakeCommand;

use crate::core::config::Config;
use crate::history::{DirectoryHistory, HistoryError};
use crate::path::PathError;
use crate::process::ProcessError;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}: command not found")]
    NotFound(String),
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{command}: {}: {source}", .path.display())]
    ChangeDir {
        command: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// What the shell loop should do after a built-in returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Exit,
}

/// Shell state a built-in may read or change for the length of one call.
pub struct ShellContext<'a> {
    pub history: &'a mut DirectoryHistory,
    pub config: &'a Config,
    pub starting_dir: &'a Path,
}

pub trait Command {
    fn execute(&self, args: &[String], ctx: &mut ShellContext<'_>) -> Result<Outcome, CommandError>;
}

#[derive(Clone)]
enum CommandType {
    Cd(CdCommand),
    Cdh(CdhCommand),
    Take(TakeCommand),
    Exit(ExitCommand),
    FileSearch(FileSearchCommand),
}

impl Command for CommandType {
    fn execute(&self, args: &[String], ctx: &mut ShellContext<'_>) -> Result<Outcome, CommandError> {
        match self {
            CommandType::Cd(cmd) => cmd.execute(args, ctx),
            CommandType::Cdh(cmd) => cmd.execute(args, ctx),
            CommandType::Take(cmd) => cmd.execute(args, ctx),
            CommandType::Exit(cmd) => cmd.execute(args, ctx),
            CommandType::FileSearch(cmd) => cmd.execute(args, ctx),
        }
    }
}

/// Table of built-ins, consulted before any external program is looked up.
#[derive(Clone)]
pub struct CommandExecutor {
    commands: BTreeMap<&'static str, CommandType>,
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor {
    pub fn new() -> Self {
        let mut commands = BTreeMap::new();
        commands.insert("cd", CommandType::Cd(CdCommand::new()));
        commands.insert("cdh", CommandType::Cdh(CdhCommand::new()));
        commands.insert("take", CommandType::Take(TakeCommand::new()));
        commands.insert("exit", CommandType::Exit(ExitCommand));
        commands.insert("filesearch", CommandType::FileSearch(FileSearchCommand));
        Self { commands }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.commands.keys().copied().collect()
    }

    pub fn is_builtin(&self, command: &str) -> bool {
        self.commands.contains_key(command)
    }

    pub fn execute(
        &self,
        command: &str,
        args: &[String],
        ctx: &mut ShellContext<'_>,
    ) -> Result<Outcome, CommandError> {
        let cmd = self
            .commands
            .get(command)
            .ok_or_else(|| CommandError::NotFound(command.to_string()))?;
        log::debug!("built-in {} {:?}", command, args);
        cmd.execute(args, ctx)
    }
}

/// Moves the shell into `target` and records where it ended up.
pub(crate) fn enter_directory(
    command: &'static str,
    target: &Path,
    history: &mut DirectoryHistory,
) -> Result<PathBuf, CommandError> {
    env::set_current_dir(target).map_err(|source| CommandError::ChangeDir {
        command,
        path: target.to_path_buf(),
        source,
    })?;
    let now = env::current_dir()?;
    history.record(now.clone());
    Ok(now)
}
