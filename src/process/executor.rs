use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

use super::{JobTable, ProcessError};
use crate::path::PathResolver;
use crate::shell::{Pipeline, Stage};

/// Turns a parsed pipeline into running processes.
#[derive(Clone, Default)]
pub struct ProcessExecutor {
    resolver: PathResolver,
    quiet: bool,
}

impl ProcessExecutor {
    /// With `quiet` set, starting a background job prints nothing.
    pub fn new(resolver: PathResolver, quiet: bool) -> Self {
        Self { resolver, quiet }
    }

    /// Runs `pipeline`, waiting for it unless it is backgrounded. `line` is
    /// what gets reported when a background job finishes.
    pub fn run(
        &self,
        pipeline: &Pipeline,
        jobs: &mut JobTable,
        line: &str,
    ) -> Result<Option<ExitStatus>, ProcessError> {
        let background = pipeline.is_background();
        let children = self.spawn(pipeline, background)?;

        if background {
            let pids: Vec<String> = children.iter().map(|c| c.id().to_string()).collect();
            let id = jobs.add(line, children);
            if let Some(notice) = self.job_notice(id, &pids) {
                println!("{}", notice);
            }
            return Ok(None);
        }

        let status = wait_all(children)?;
        if let Some(status) = status.filter(|s| !s.success()) {
            log::debug!("pipeline exited with {}", status);
        }
        Ok(status)
    }

    /// Spawns every stage before anything is waited on.
    pub fn spawn(&self, pipeline: &Pipeline, background: bool) -> Result<Vec<Child>, ProcessError> {
        let programs = self.resolve_all(pipeline)?;
        let mut children: Vec<Child> = Vec::with_capacity(programs.len());
        let mut upstream: Option<Stdio> = None;

        for (index, (stage, program)) in pipeline.stages().zip(programs).enumerate() {
            // A background job must not compete with the prompt for the terminal
            let default_stdin = if background && index == 0 {
                Some(Stdio::null())
            } else {
                upstream.take()
            };

            match spawn_stage(stage, &program, default_stdin, background) {
                Ok((mut child, redirected_out)) => {
                    upstream = match child.stdout.take() {
                        Some(out) => Some(Stdio::from(out)),
                        None if redirected_out => Some(Stdio::null()),
                        None => None,
                    };
                    log::debug!("spawned {} as pid {}", program.display(), child.id());
                    children.push(child);
                }
                Err(e) => {
                    drop(upstream);
                    abandon(children);
                    return Err(e);
                }
            }
        }

        Ok(children)
    }

    fn job_notice(&self, id: usize, pids: &[String]) -> Option<String> {
        (!self.quiet).then(|| format!("[{}] {}", id, pids.join(" ")))
    }

    fn resolve_all(&self, pipeline: &Pipeline) -> Result<Vec<PathBuf>, ProcessError> {
        pipeline
            .stages()
            .map(|stage| {
                let program = self
                    .resolver
                    .resolve(&stage.name)
                    .ok_or_else(|| ProcessError::CommandNotFound(stage.name.clone()))?;
                log::debug!("resolved {} to {}", stage.name, program.display());
                Ok(program)
            })
            .collect()
    }
}

/// Returns the child and whether its stdout went to a file.
fn spawn_stage(
    stage: &Stage,
    program: &Path,
    default_stdin: Option<Stdio>,
    background: bool,
) -> Result<(Child, bool), ProcessError> {
    let stdin = match &stage.redirect_in {
        Some(path) => Stdio::from(open_input(path)?),
        None => default_stdin.unwrap_or_else(Stdio::inherit),
    };

    let output = open_output(stage)?;
    let redirected_out = output.is_some();
    let stdout = match output {
        Some(file) => Stdio::from(file),
        None if stage.next.is_some() => Stdio::piped(),
        None => Stdio::inherit(),
    };

    let mut command = Command::new(program);
    command.args(&stage.args).stdin(stdin).stdout(stdout);
    if background {
        // Keeps terminal-generated signals away from background jobs
        command.process_group(0);
    }

    // Pipe ends are close-on-exec; the parent's copies go away with `command`
    let child = command.spawn().map_err(|source| ProcessError::Spawn {
        name: stage.name.clone(),
        source,
    })?;
    Ok((child, redirected_out))
}

fn open_input(path: &str) -> Result<File, ProcessError> {
    File::open(path).map_err(|source| ProcessError::Redirect {
        path: path.to_string(),
        source,
    })
}

fn open_output(stage: &Stage) -> Result<Option<File>, ProcessError> {
    let (path, append) = match (&stage.redirect_out_truncate, &stage.redirect_out_append) {
        (Some(path), _) => (path, false),
        (None, Some(path)) => (path, true),
        (None, None) => return Ok(None),
    };

    let mut options = OpenOptions::new();
    options.write(true).create(true).mode(0o644);
    if append {
        options.append(true);
    } else {
        options.truncate(true);
    }

    options
        .open(path)
        .map(Some)
        .map_err(|source| ProcessError::Redirect {
            path: path.clone(),
            source,
        })
}

/// Waits for every stage in order and returns the status of the last one.
fn wait_all(children: Vec<Child>) -> Result<Option<ExitStatus>, ProcessError> {
    wait_each(children, |mut child| child.wait())
}

/// Keeps waiting after a failure so no stage is left unreaped, then reports
/// the first failure.
fn wait_each<T>(
    children: Vec<T>,
    mut wait: impl FnMut(T) -> io::Result<ExitStatus>,
) -> Result<Option<ExitStatus>, ProcessError> {
    let mut last = None;
    let mut first_err = None;
    for child in children {
        match wait(child) {
            Ok(status) => last = Some(status),
            Err(e) => {
                log::warn!("failed to wait for pipeline stage: {}", e);
                first_err.get_or_insert(e);
            }
        }
    }
    match first_err {
        Some(e) => Err(e.into()),
        None => Ok(last),
    }
}

/// Reaps stages that were started before a later stage failed to spawn.
fn abandon(children: Vec<Child>) {
    for mut child in children {
        if let Err(e) = child.wait() {
            log::warn!("failed to reap pid {}: {}", child.id(), e);
        }
    }
}
