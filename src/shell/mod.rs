use std::env;
use std::fmt::Display;
use std::path::PathBuf;

mod executor;
mod pipeline;

pub use pipeline::{Pipeline, Stage, Stages};

use crate::{
    core::{
        commands::CommandExecutor,
        config::{Config, SYSNAME},
    },
    error::ShellError,
    highlight::Palette,
    history::DirectoryHistory,
    input::{terminal, LineEditor, LineResult, ShellCompleter},
    path::PathResolver,
    process::{signal, JobTable, ProcessExecutor},
};

use executor::CommandHandler;

/// Result of running one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStatus {
    Continue,
    Exit,
    NotFound,
}

pub struct Shell {
    pub(crate) editor: LineEditor,
    pub(crate) completer: ShellCompleter,
    pub(crate) commands: CommandExecutor,
    pub(crate) processes: ProcessExecutor,
    pub(crate) jobs: JobTable,
    pub(crate) history: DirectoryHistory,
    pub(crate) config: Config,
    pub(crate) palette: Palette,
    pub(crate) starting_dir: PathBuf,
}

impl Shell {
    pub fn new(config: Config) -> Result<Self, ShellError> {
        let starting_dir = env::current_dir()?;
        log::debug!("directory history file: {}", config.history_path.display());

        let history = match DirectoryHistory::load(&config.history_path) {
            Ok(history) => history,
            Err(e) => {
                log::warn!(
                    "ignoring unreadable history {}: {}",
                    config.history_path.display(),
                    e
                );
                DirectoryHistory::new()
            }
        };

        let commands = CommandExecutor::new();
        let completer = ShellCompleter::new(&commands.names());

        Ok(Shell {
            editor: LineEditor::new(),
            completer,
            commands,
            processes: ProcessExecutor::new(PathResolver::new(), config.quiet),
            jobs: JobTable::new(),
            history,
            config,
            palette: Palette::new(),
            starting_dir,
        })
    }

    pub fn run(&mut self) -> Result<(), ShellError> {
        signal::setup_interrupt_handler(self.config.quiet)?;
        let child_event = signal::watch_children()?;
        self.jobs = std::mem::take(&mut self.jobs).with_notifier(child_event);

        loop {
            self.report_finished_jobs();

            let prompt = self.prompt();
            match self.editor.read_line(&prompt) {
                Ok(LineResult::Line(line)) => {
                    if self.execute_line(&line) == ExecStatus::Exit {
                        break;
                    }
                }
                Ok(LineResult::Eof) => {
                    self.execute_line("exit");
                    break;
                }
                Err(e) => {
                    log::error!("failed to read input: {}", e);
                    self.execute_line("exit");
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }

    fn report_finished_jobs(&mut self) {
        if !self.jobs.pending() {
            return;
        }
        for job in self.jobs.reap() {
            if !self.config.quiet {
                println!("[{}] Done  {}", job.id, job.line);
            }
        }
    }

    /// `user@host:cwd shellfyre$ `
    pub fn prompt(&self) -> String {
        let user = env::var("USER").unwrap_or_default();
        let cwd = env::current_dir()
            .map(|dir| dir.display().to_string())
            .unwrap_or_else(|_| "?".to_string());

        format!(
            "{}:{} {}$ ",
            self.palette
                .user_host(&format!("{}@{}", user, terminal::hostname())),
            self.palette.cwd(&cwd),
            self.palette.sysname(SYSNAME)
        )
    }

    pub(crate) fn report(&self, err: &dyn Display) {
        if self.config.quiet {
            return;
        }
        eprintln!("{}", self.palette.error(&format!("{}: {}", SYSNAME, err)));
    }
}
