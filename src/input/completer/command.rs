use std::{borrow::Cow, collections::BTreeSet, env, fs, os::unix::fs::PermissionsExt};

use super::Candidate;

#[derive(Clone, Default)]
pub struct CommandCompleter {
    commands: BTreeSet<Cow<'static, str>>,
}

impl CommandCompleter {
    pub fn new(builtins: &[&'static str]) -> Self {
        let mut completer = Self::default();
        completer.refresh_commands(builtins);
        completer
    }

    pub fn refresh_commands(&mut self, builtins: &[&'static str]) {
        self.commands.clear();
        self.commands
            .extend(builtins.iter().map(|name| Cow::Borrowed(*name)));
        self.add_path_commands();
    }

    fn add_path_commands(&mut self) {
        let Some(path_var) = env::var_os("PATH") else {
            return;
        };
        for dir in env::split_paths(&path_var) {
            let Ok(entries) = fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.filter_map(Result::ok) {
                let executable = entry
                    .metadata()
                    .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
                    .unwrap_or(false);
                if let (true, Some(name)) = (executable, entry.file_name().to_str()) {
                    self.commands.insert(Cow::Owned(name.to_string()));
                }
            }
        }
    }

    pub fn complete_command(&self, input: &str) -> Vec<Candidate> {
        self.commands
            .iter()
            .filter(|cmd| cmd.starts_with(input))
            .map(|cmd| Candidate {
                display: cmd.to_string(),
                replacement: format!("{} ", cmd),
            })
            .collect()
    }
}
