use std::{
    fs,
    path::{Path, PathBuf},
};

use super::Candidate;

#[derive(Clone, Default)]
pub struct PathCompleter;

impl PathCompleter {
    pub fn new() -> Self {
        Self
    }

    pub fn complete_path(&self, incomplete: &str) -> Vec<Candidate> {
        let (dir_to_search, file_prefix) = parse_path_input(incomplete);
        let mut matches = Vec::new();

        let Ok(entries) = fs::read_dir(&dir_to_search) else {
            return matches;
        };
        for entry in entries.filter_map(Result::ok) {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            // Hidden entries only when asked for
            if name.starts_with('.') && !file_prefix.starts_with('.') {
                continue;
            }
            if name.starts_with(&file_prefix) {
                matches.push(candidate(&name, &entry.path(), &dir_to_search, incomplete));
            }
        }

        matches.sort_by(|a, b| a.display.cmp(&b.display));
        matches
    }
}

fn parse_path_input(incomplete: &str) -> (PathBuf, String) {
    let path = Path::new(incomplete);

    if incomplete.is_empty() {
        (PathBuf::from("."), String::new())
    } else if incomplete.ends_with('/') {
        (PathBuf::from(incomplete), String::new())
    } else if let Some(parent) = path.parent() {
        let dir = if parent.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            parent.to_path_buf()
        };
        let prefix = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();
        (dir, prefix)
    } else {
        (PathBuf::from("."), incomplete.to_string())
    }
}

fn candidate(name: &str, path: &Path, dir_to_search: &Path, incomplete: &str) -> Candidate {
    let typed_dir = if dir_to_search == Path::new(".") && !incomplete.starts_with("./") {
        String::new()
    } else if incomplete.ends_with('/') {
        incomplete.to_string()
    } else {
        let cut = incomplete.rfind('/').map_or(0, |i| i + 1);
        incomplete[..cut].to_string()
    };
    let full = format!("{}{}", typed_dir, name);

    if path.is_dir() {
        Candidate {
            display: format!("{}/", full),
            replacement: format!("{}/", full),
        }
    } else {
        Candidate {
            display: full.clone(),
            replacement: format!("{} ", full),
        }
    }
}
