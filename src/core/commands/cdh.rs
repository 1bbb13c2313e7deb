use std::io::{self, Read, Write};
use std::os::unix::io::RawFd;
use std::path::{Path, PathBuf};

use super::{enter_directory, Command, CommandError, Outcome, ShellContext};
use crate::history::{letter_for, DirectoryHistory};
use crate::input::terminal::FdReader;
use crate::process::{channel, ProcessError};

const SELECT_PROMPT: &str = "select a letter or a number to navigate: ";

/// Lists the directory history and jumps to the entry the user picks.
#[derive(Clone, Copy)]
pub struct CdhCommand {
    input: RawFd,
}

impl Default for CdhCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl CdhCommand {
    pub fn new() -> Self {
        Self::reading_from(libc::STDIN_FILENO)
    }

    /// Takes the selection from `input` instead of standard input.
    pub fn reading_from(input: RawFd) -> Self {
        Self { input }
    }
}

impl Command for CdhCommand {
    fn execute(&self, _args: &[String], ctx: &mut ShellContext<'_>) -> Result<Outcome, CommandError> {
        if ctx.history.is_empty() {
            println!("cdh: no directory history");
            return Ok(Outcome::Continue);
        }

        let history: &DirectoryHistory = ctx.history;
        let reply = channel::request(|| {
            let mut input = FdReader::new(self.input);
            let mut output = io::stdout().lock();
            select_from(history, &mut input, &mut output).map(|p| p.display().to_string())
        });

        let selected = match reply {
            Ok(path) => PathBuf::from(path),
            Err(ProcessError::WorkerFailed(pid)) => {
                log::debug!("cdh selection in {} was abandoned", pid);
                return Ok(Outcome::Continue);
            }
            Err(e) => return Err(e.into()),
        };

        enter_directory("cdh", &selected, ctx.history)?;
        Ok(Outcome::Continue)
    }
}

/// Prints the numbered listing, then reads one selection line.
pub fn select_from<R: Read, W: Write>(
    history: &DirectoryHistory,
    input: &mut R,
    output: &mut W,
) -> Result<PathBuf, CommandError> {
    for (index, path) in history.list() {
        writeln!(output, "{} {}) {}", letter_for(index), index, path.display())?;
    }
    write!(output, "{}", SELECT_PROMPT)?;
    output.flush()?;

    let Some(line) = read_selection(input)? else {
        return Err(CommandError::InvalidArguments(
            "cdh: no selection made".to_string(),
        ));
    };

    let selected: &Path = history.select(line.trim())?;
    Ok(selected.to_path_buf())
}

/// One line, a byte per read, so the rest of the input stays with the shell.
fn read_selection<R: Read>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match input.read(&mut byte) {
            Ok(0) if line.is_empty() => return Ok(None),
            Ok(0) => break,
            Ok(_) if byte[0] == b'\n' => break,
            Ok(_) => line.push(byte[0]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(Some(String::from_utf8_lossy(&line).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::testing::{config_in, CwdGuard};
    use crate::history::HistoryError;
    use serial_test::serial;
    use std::env;
    use std::fs::File;
    use std::io::Cursor;
    use std::os::unix::io::{AsRawFd, FromRawFd};

    fn sample() -> DirectoryHistory {
        let mut history = DirectoryHistory::new();
        history.record("/usr");
        history.record("/tmp");
        history.record("/var/log");
        history
    }

    fn pick(history: &DirectoryHistory, typed: &str) -> (Result<PathBuf, CommandError>, String) {
        let mut input = Cursor::new(typed.as_bytes().to_vec());
        let mut output = Vec::new();
        let result = select_from(history, &mut input, &mut output);
        (result, String::from_utf8_lossy(&output).into_owned())
    }

    #[test]
    fn test_listing_format() {
        let (_, shown) = pick(&sample(), "1\n");
        assert_eq!(
            shown,
            format!("a 1) /usr\nb 2) /tmp\nc 3) /var/log\n{}", SELECT_PROMPT)
        );
    }

    #[test]
    fn test_select_by_number_or_letter() {
        let history = sample();
        assert_eq!(pick(&history, "2\n").0.ok(), Some(PathBuf::from("/tmp")));
        assert_eq!(pick(&history, "c\n").0.ok(), Some(PathBuf::from("/var/log")));
        assert_eq!(pick(&history, " A \n").0.ok(), Some(PathBuf::from("/usr")));
    }

    #[test]
    fn test_bad_selection() {
        let history = sample();
        assert!(matches!(
            pick(&history, "9\n").0,
            Err(CommandError::History(HistoryError::OutOfRange(9)))
        ));
        assert!(matches!(
            pick(&history, "hello\n").0,
            Err(CommandError::History(HistoryError::InvalidKey(_)))
        ));
        assert!(matches!(
            pick(&history, "").0,
            Err(CommandError::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_selection_leaves_rest_of_input() -> Result<(), CommandError> {
        let mut input = Cursor::new(b"2\npwd\n".to_vec());
        let mut output = Vec::new();

        let selected = select_from(&sample(), &mut input, &mut output)?;
        assert_eq!(selected, PathBuf::from("/tmp"));
        assert_eq!(input.position(), 2);
        Ok(())
    }

    #[test]
    #[serial]
    fn test_cdh_enters_selected_directory() -> Result<(), Box<dyn std::error::Error>> {
        let _guard = CwdGuard::new();
        let first = tempfile::tempdir()?;
        let second = tempfile::tempdir()?;
        let config = config_in(first.path());
        let mut history = DirectoryHistory::new();
        history.record(first.path().canonicalize()?);
        history.record(second.path().canonicalize()?);

        let mut fds = [0; 2];
        assert_eq!(unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) }, 0);
        let mut read_end = unsafe { File::from_raw_fd(fds[0]) };
        let mut write_end = unsafe { File::from_raw_fd(fds[1]) };
        write_end.write_all(b"b\npwd\n")?;
        drop(write_end);

        let mut ctx = ShellContext {
            history: &mut history,
            config: &config,
            starting_dir: first.path(),
        };
        let cdh = CdhCommand::reading_from(read_end.as_raw_fd());
        assert_eq!(cdh.execute(&[], &mut ctx)?, Outcome::Continue);

        let expected = second.path().canonicalize()?;
        assert_eq!(env::current_dir()?, expected);
        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().last(), Some(expected.as_path()));

        let mut rest = String::new();
        read_end.read_to_string(&mut rest)?;
        assert_eq!(rest, "pwd\n");
        Ok(())
    }

    #[test]
    fn test_empty_history_does_nothing() -> Result<(), CommandError> {
        let scratch = env::temp_dir();
        let config = config_in(&scratch);
        let mut history = DirectoryHistory::new();
        let mut ctx = ShellContext {
            history: &mut history,
            config: &config,
            starting_dir: &scratch,
        };

        assert_eq!(CdhCommand::new().execute(&[], &mut ctx)?, Outcome::Continue);
        assert!(history.is_empty());
        Ok(())
    }
}
