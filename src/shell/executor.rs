use super::{ExecStatus, Pipeline, Shell};
use crate::core::commands::{Outcome, ShellContext};
use crate::error::ShellError;
use crate::process::ProcessError;

pub(crate) trait CommandHandler {
    fn execute_line(&mut self, line: &str) -> ExecStatus;
    fn execute(&mut self, pipeline: &Pipeline, line: &str) -> Result<ExecStatus, ShellError>;
}

impl CommandHandler for Shell {
    fn execute_line(&mut self, line: &str) -> ExecStatus {
        let pipeline = Pipeline::parse(line);
        log::debug!("parsed {:?}:\n{}", line, pipeline);

        match self.execute(&pipeline, line) {
            Ok(status) => status,
            Err(e) => {
                self.report(&e);
                ExecStatus::Continue
            }
        }
    }

    fn execute(&mut self, pipeline: &Pipeline, line: &str) -> Result<ExecStatus, ShellError> {
        if pipeline.is_empty() {
            return Ok(ExecStatus::Continue);
        }

        if pipeline.has_empty_stage() {
            self.report(&"syntax error near '|'");
            return Ok(ExecStatus::Continue);
        }

        if pipeline.wants_autocomplete() {
            self.autocomplete(line);
            return Ok(ExecStatus::Continue);
        }

        if let Some(stage) = pipeline
            .stages()
            .find(|stage| self.commands.is_builtin(&stage.name))
        {
            if pipeline.len() > 1 {
                self.report(&format!("{}: cannot be used in a pipeline", stage.name));
                return Ok(ExecStatus::Continue);
            }
            return self.run_builtin(pipeline);
        }

        match self.processes.run(pipeline, &mut self.jobs, line) {
            Ok(_) => Ok(ExecStatus::Continue),
            Err(e @ ProcessError::CommandNotFound(_)) => {
                self.report(&e);
                Ok(ExecStatus::NotFound)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Shell {
    fn run_builtin(&mut self, pipeline: &Pipeline) -> Result<ExecStatus, ShellError> {
        let stage = pipeline.head();
        let mut ctx = ShellContext {
            history: &mut self.history,
            config: &self.config,
            starting_dir: &self.starting_dir,
        };

        let outcome = self.commands.execute(&stage.name, &stage.args, &mut ctx)?;
        Ok(match outcome {
            Outcome::Continue => ExecStatus::Continue,
            Outcome::Exit => ExecStatus::Exit,
        })
    }

    /// Prints what the unfinished word could become. A single match is
    /// typed into the next prompt.
    fn autocomplete(&mut self, line: &str) {
        let typed = line.trim_end().strip_suffix('?').unwrap_or(line);

        // Names appearing on PATH since startup should complete too
        if !typed.trim_start().contains([' ', '\t']) {
            self.completer.refresh_commands(&self.commands.names());
        }

        let (candidates, completed) = self.completer.complete_line(typed);
        for candidate in &candidates {
            println!("{}", self.palette.hint(&candidate.display));
        }
        if let Some(completed) = completed {
            self.editor.seed(completed);
        }
    }
}
