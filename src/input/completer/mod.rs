mod command;
mod path;

use command::CommandCompleter;
use path::PathCompleter;

/// One completion choice: what to show and what to put in the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub display: String,
    pub replacement: String,
}

#[derive(Clone)]
pub struct ShellCompleter {
    command_completer: CommandCompleter,
    path_completer: PathCompleter,
}

impl ShellCompleter {
    pub fn new(builtins: &[&'static str]) -> Self {
        ShellCompleter {
            command_completer: CommandCompleter::new(builtins),
            path_completer: PathCompleter::new(),
        }
    }

    pub fn refresh_commands(&mut self, builtins: &[&'static str]) {
        self.command_completer.refresh_commands(builtins);
    }

    /// Completes the last word of `line`. The first word is matched
    /// against command names, later words against the filesystem.
    /// Returns the byte offset where the replaced word starts.
    pub fn complete(&self, line: &str) -> (usize, Vec<Candidate>) {
        let mut words: Vec<&str> = line.split_whitespace().collect();
        if line.ends_with([' ', '\t']) {
            words.push("");
        }

        match words.len() {
            0 => (0, self.command_completer.complete_command("")),
            1 => {
                let word = words[0];
                let start = line.rfind(word).unwrap_or(0);
                (start, self.command_completer.complete_command(word))
            }
            _ => {
                let last_word = words.last().copied().unwrap_or("");
                let start = if last_word.is_empty() {
                    line.len()
                } else {
                    line.rfind(last_word).unwrap_or(line.len())
                };
                (start, self.path_completer.complete_path(last_word))
            }
        }
    }

    /// The line with its last word replaced, when there is exactly one
    /// candidate.
    pub fn complete_line(&self, line: &str) -> (Vec<Candidate>, Option<String>) {
        let (start, matches) = self.complete(line);
        let completed = match matches.as_slice() {
            [only] => Some(format!("{}{}", &line[..start], only.replacement)),
            _ => None,
        };
        (matches, completed)
    }
}
