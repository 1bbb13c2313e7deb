use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command as Process, Stdio};
use std::thread;

use super::{Command, CommandError, Outcome, ShellContext};

const USAGE: &str = "filesearch: usage: filesearch <needle> [-r] [-o]";
const OPENER: &str = "xdg-open";

#[derive(Debug, Clone, PartialEq, Eq)]
struct SearchOptions {
    needle: String,
    recursive: bool,
    open: bool,
}

fn parse_args(args: &[String]) -> Result<SearchOptions, CommandError> {
    let mut needle = None;
    let mut recursive = false;
    let mut open = false;

    for arg in args {
        match arg.as_str() {
            "-r" => recursive = true,
            "-o" => open = true,
            flag if flag.starts_with('-') => {
                return Err(CommandError::InvalidArguments(format!(
                    "filesearch: unknown option {}",
                    flag
                )))
            }
            word if needle.is_none() => needle = Some(word.to_string()),
            _ => return Err(CommandError::InvalidArguments(USAGE.to_string())),
        }
    }

    let needle = needle.ok_or_else(|| CommandError::InvalidArguments(USAGE.to_string()))?;
    Ok(SearchOptions {
        needle,
        recursive,
        open,
    })
}

/// Prints entries of the working directory whose names contain a word.
#[derive(Clone, Copy, Default)]
pub struct FileSearchCommand;

impl Command for FileSearchCommand {
    fn execute(&self, args: &[String], _ctx: &mut ShellContext<'_>) -> Result<Outcome, CommandError> {
        let options = parse_args(args)?;
        let root = env::current_dir()?;

        for found in search(&root, &options.needle, options.recursive)? {
            println!("{}", found.display());
            if options.open {
                open(&found);
            }
        }
        Ok(Outcome::Continue)
    }
}

/// Matching paths under `root`, sorted. Symlinked directories are not
/// followed.
pub fn search(root: &Path, needle: &str, recursive: bool) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().contains(needle) {
                found.push(entry.path());
            }
            if recursive && entry.file_type()?.is_dir() {
                pending.push(entry.path());
            }
        }
    }

    found.sort();
    Ok(found)
}

fn open(path: &Path) {
    match Process::new(OPENER)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        // Reaped off the prompt thread so the opener never turns into a zombie
        Ok(mut child) => {
            thread::spawn(move || child.wait());
        }
        Err(e) => log::warn!("could not run {} on {}: {}", OPENER, path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn tree() -> io::Result<tempfile::TempDir> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("report.txt"), "")?;
        fs::write(dir.path().join("notes.md"), "")?;
        fs::create_dir_all(dir.path().join("old").join("reports"))?;
        fs::write(dir.path().join("old").join("report-2019.txt"), "")?;
        Ok(dir)
    }

    #[test]
    fn test_parse_args() -> Result<(), CommandError> {
        assert_eq!(
            parse_args(&args(&["-r", "todo", "-o"]))?,
            SearchOptions {
                needle: "todo".to_string(),
                recursive: true,
                open: true,
            }
        );
        assert!(matches!(parse_args(&[]), Err(CommandError::InvalidArguments(_))));
        assert!(matches!(
            parse_args(&args(&["a", "-x"])),
            Err(CommandError::InvalidArguments(_))
        ));
        assert!(matches!(
            parse_args(&args(&["a", "b"])),
            Err(CommandError::InvalidArguments(_))
        ));
        Ok(())
    }

    #[test]
    fn test_flat_search() -> io::Result<()> {
        let dir = tree()?;
        let found = search(dir.path(), "report", false)?;
        assert_eq!(found, vec![dir.path().join("report.txt")]);
        Ok(())
    }

    #[test]
    fn test_recursive_search() -> io::Result<()> {
        let dir = tree()?;
        let found = search(dir.path(), "report", true)?;

        assert_eq!(
            found,
            vec![
                dir.path().join("old").join("report-2019.txt"),
                dir.path().join("old").join("reports"),
                dir.path().join("report.txt"),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_no_match() -> io::Result<()> {
        let dir = tree()?;
        assert!(search(dir.path(), "zzz", true)?.is_empty());
        Ok(())
    }
}
