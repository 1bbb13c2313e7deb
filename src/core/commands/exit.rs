use std::env;

use super::{Command, CommandError, Outcome, ShellContext};

#[derive(Clone, Copy, Default)]
pub struct ExitCommand;

impl Command for ExitCommand {
    fn execute(&self, _args: &[String], ctx: &mut ShellContext<'_>) -> Result<Outcome, CommandError> {
        // Relative history paths are relative to where the shell started
        if let Err(e) = env::set_current_dir(ctx.starting_dir) {
            log::warn!(
                "could not return to {}: {}",
                ctx.starting_dir.display(),
                e
            );
        }

        if let Err(e) = ctx.history.save(&ctx.config.history_path) {
            log::error!(
                "failed to save directory history to {}: {}",
                ctx.config.history_path.display(),
                e
            );
        }

        Ok(Outcome::Exit)
    }
}
