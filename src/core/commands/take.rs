use std::env;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use super::{enter_directory, Command, CommandError, Outcome, ShellContext};
use crate::path::PathExpander;
use crate::process::{channel, ProcessError};

/// `take a/b/c`: creates whatever part of the path is missing and moves
/// the shell into the last directory.
#[derive(Clone, Default)]
pub struct TakeCommand {
    expander: PathExpander,
}

impl TakeCommand {
    pub fn new() -> Self {
        Self {
            expander: PathExpander::new(),
        }
    }
}

impl Command for TakeCommand {
    fn execute(&self, args: &[String], ctx: &mut ShellContext<'_>) -> Result<Outcome, CommandError> {
        let Some(target) = args.first() else {
            return Err(CommandError::InvalidArguments(
                "take: usage: take <nested/path>".to_string(),
            ));
        };
        let nested = self.expander.expand(target)?;

        // The worker's chdir calls stay in the worker
        let reply = channel::request(|| {
            make_nested(&nested).map(|made| made.display().to_string())
        });

        let made = match reply {
            Ok(path) => PathBuf::from(path),
            Err(ProcessError::WorkerFailed(pid)) => {
                log::debug!("take worker {} gave up on {}", pid, nested.display());
                return Ok(Outcome::Continue);
            }
            Err(e) => return Err(e.into()),
        };

        enter_directory("take", &made, ctx.history)?;
        Ok(Outcome::Continue)
    }
}

/// Walks `nested` one segment at a time from the current directory (from
/// `/` when absolute), creating each missing directory and changing into
/// it. Returns the directory it ends in.
pub fn make_nested(nested: &Path) -> Result<PathBuf, CommandError> {
    for component in nested.components() {
        let step: &Path = match component {
            Component::RootDir => Path::new("/"),
            Component::Normal(segment) => {
                create_segment(Path::new(segment))?;
                Path::new(segment)
            }
            Component::ParentDir => Path::new(".."),
            Component::CurDir | Component::Prefix(_) => continue,
        };
        env::set_current_dir(step).map_err(|source| take_error(step, source))?;
    }
    Ok(env::current_dir()?)
}

fn create_segment(segment: &Path) -> Result<(), CommandError> {
    match fs::create_dir(segment) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(take_error(segment, e)),
    }
}

fn take_error(path: &Path, source: io::Error) -> CommandError {
    CommandError::ChangeDir {
        command: "take",
        path: path.to_path_buf(),
        source,
    }
}
