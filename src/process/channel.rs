//! One-shot result return from a forked worker.
//!
//! Built-ins that do their work in a child process (`take`, `cdh`) get the
//! outcome back over a pipe created before the fork: the child writes one
//! newline-terminated message and exits, the parent reads until the write
//! end closes and then reaps the child.

use std::fmt::Display;
use std::fs::File;
use std::io::{self, Read, Write};
use std::os::unix::io::FromRawFd;
use std::panic::{self, AssertUnwindSafe};

use super::ProcessError;
use crate::core::config::SYSNAME;

const EXIT_OK: i32 = 0;
const EXIT_FAILED: i32 = 1;
const EXIT_PANICKED: i32 = 101;

pub fn request<F, E>(work: F) -> Result<String, ProcessError>
where
    F: FnOnce() -> Result<String, E>,
    E: Display,
{
    let (mut reader, writer) = pipe()?;

    // Buffered output would otherwise be written twice
    io::stdout().flush()?;

    match unsafe { libc::fork() } {
        -1 => Err(io::Error::last_os_error().into()),
        0 => {
            drop(reader);
            let code = respond(writer, work);
            unsafe { libc::_exit(code) }
        }
        pid => {
            drop(writer);
            let mut message = String::new();
            let read = reader.read_to_string(&mut message);
            let status = wait_pid(pid)?;
            read?;

            if libc::WIFEXITED(status) && libc::WEXITSTATUS(status) == EXIT_FAILED {
                return Err(ProcessError::WorkerFailed(pid));
            }
            if !(libc::WIFEXITED(status) && libc::WEXITSTATUS(status) == EXIT_OK) {
                return Err(ProcessError::Channel(format!(
                    "worker {} failed with status {}",
                    pid, status
                )));
            }
            match message.strip_suffix('\n') {
                Some(reply) if !reply.is_empty() => Ok(reply.to_string()),
                _ => Err(ProcessError::Channel("empty reply".to_string())),
            }
        }
    }
}

fn respond<F, E>(mut writer: File, work: F) -> i32
where
    F: FnOnce() -> Result<String, E>,
    E: Display,
{
    let code = match panic::catch_unwind(AssertUnwindSafe(work)) {
        Ok(Ok(message)) => match writeln!(writer, "{}", message) {
            Ok(()) => EXIT_OK,
            Err(_) => EXIT_FAILED,
        },
        Ok(Err(reason)) => {
            eprintln!("{}: {}", SYSNAME, reason);
            EXIT_FAILED
        }
        Err(_) => EXIT_PANICKED,
    };
    let _ = io::stdout().flush();
    code
}

fn pipe() -> io::Result<(File, File)> {
    let mut fds = [0; 2];
    if unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) } != 0 {
        return Err(io::Error::last_os_error());
    }
    // Both descriptors are fresh and owned by nothing else
    Ok(unsafe { (File::from_raw_fd(fds[0]), File::from_raw_fd(fds[1])) })
}

fn wait_pid(pid: libc::pid_t) -> io::Result<libc::c_int> {
    let mut status = 0;
    loop {
        if unsafe { libc::waitpid(pid, &mut status, 0) } != -1 {
            return Ok(status);
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}
