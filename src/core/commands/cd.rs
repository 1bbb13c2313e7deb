use super::{enter_directory, Command, CommandError, Outcome, ShellContext};
use crate::path::PathExpander;

#[derive(Clone, Default)]
pub struct CdCommand {
    expander: PathExpander,
}

impl CdCommand {
    pub fn new() -> Self {
        Self {
            expander: PathExpander::new(),
        }
    }
}

impl Command for CdCommand {
    fn execute(&self, args: &[String], ctx: &mut ShellContext<'_>) -> Result<Outcome, CommandError> {
        let target = match args.first() {
            Some(path) => self.expander.expand(path)?,
            None => self.expander.home_dir()?,
        };

        enter_directory("cd", &target, ctx.history)?;
        Ok(Outcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::testing::{config_in, CwdGuard};
    use crate::history::DirectoryHistory;
    use serial_test::serial;
    use std::env;

    fn cd(args: &[&str], history: &mut DirectoryHistory) -> Result<Outcome, CommandError> {
        let scratch = env::temp_dir();
        let config = config_in(&scratch);
        let mut ctx = ShellContext {
            history,
            config: &config,
            starting_dir: &scratch,
        };
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        CdCommand::new().execute(&args, &mut ctx)
    }

    #[test]
    #[serial]
    fn test_cd_to_directory() -> Result<(), Box<dyn std::error::Error>> {
        let _guard = CwdGuard::new();
        let dir = tempfile::tempdir()?;
        let mut history = DirectoryHistory::new();

        let target = dir.path().display().to_string();
        assert_eq!(cd(&[&target], &mut history)?, Outcome::Continue);

        let canonical = dir.path().canonicalize()?;
        assert_eq!(env::current_dir()?, canonical);
        assert_eq!(history.list(), vec![(1, canonical.as_path())]);
        Ok(())
    }

    #[test]
    #[serial]
    fn test_cd_relative() -> Result<(), Box<dyn std::error::Error>> {
        let _guard = CwdGuard::new();
        let dir = tempfile::tempdir()?;
        std::fs::create_dir(dir.path().join("sub"))?;
        env::set_current_dir(dir.path())?;
        let mut history = DirectoryHistory::new();

        cd(&["sub"], &mut history)?;
        assert_eq!(env::current_dir()?, dir.path().canonicalize()?.join("sub"));
        Ok(())
    }

    #[test]
    #[serial]
    fn test_cd_home() -> Result<(), Box<dyn std::error::Error>> {
        let _guard = CwdGuard::new();
        let Some(home) = dirs::home_dir().filter(|h| h.is_dir()) else {
            return Ok(());
        };
        let mut history = DirectoryHistory::new();

        cd(&[], &mut history)?;
        assert_eq!(env::current_dir()?, home.canonicalize()?);

        cd(&["~"], &mut history)?;
        assert_eq!(history.len(), 2);
        Ok(())
    }

    #[test]
    #[serial]
    fn test_cd_missing_directory() -> Result<(), Box<dyn std::error::Error>> {
        let _guard = CwdGuard::new();
        let before = env::current_dir()?;
        let mut history = DirectoryHistory::new();

        let result = cd(&["/path/that/does/not/exist"], &mut history);
        assert!(matches!(result, Err(CommandError::ChangeDir { command: "cd", .. })));
        assert_eq!(env::current_dir()?, before);
        assert!(history.is_empty());
        Ok(())
    }
}
