use std::{
    ffi::OsStr,
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    os::unix::ffi::OsStrExt,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Number of directories remembered across sessions.
pub const CAPACITY: usize = 10;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("no entry {0} in directory history")]
    OutOfRange(usize),
    #[error("invalid selection: {0}")]
    InvalidKey(String),
    #[error("history file error: {0}")]
    Io(#[from] std::io::Error),
}

mod file_ops {
    use super::*;

    pub fn load_lines(file_path: &Path) -> Result<Vec<PathBuf>, HistoryError> {
        let mut entries = Vec::new();

        // First run: no file yet means no history yet
        if !file_path.exists() {
            return Ok(entries);
        }

        // Paths are raw bytes, not necessarily UTF-8
        let reader = BufReader::new(File::open(file_path)?);
        for line in reader.split(b'\n') {
            let line = line?;
            if !line.iter().all(u8::is_ascii_whitespace) {
                entries.push(PathBuf::from(OsStr::from_bytes(&line)));
            }
        }

        Ok(entries)
    }

    pub fn write_lines<'a>(
        file_path: &Path,
        entries: impl Iterator<Item = &'a Path>,
    ) -> Result<(), HistoryError> {
        let mut writer = BufWriter::new(File::create(file_path)?);
        for entry in entries {
            writer.write_all(entry.as_os_str().as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Fixed-capacity ring of visited directories, oldest entry at `head`.
///
/// Once the ring has wrapped, `full` is set and `head == tail`: the next
/// `record` overwrites the oldest slot and moves both indices forward.
#[derive(Debug, Clone)]
pub struct DirectoryHistory {
    slots: Vec<Option<PathBuf>>,
    head: usize,
    tail: usize,
    full: bool,
}

impl Default for DirectoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryHistory {
    pub fn new() -> Self {
        Self {
            slots: vec![None; CAPACITY],
            head: 0,
            tail: 0,
            full: false,
        }
    }

    pub fn load(file_path: &Path) -> Result<Self, HistoryError> {
        let mut history = Self::new();
        for entry in file_ops::load_lines(file_path)? {
            history.record(entry);
        }
        log::debug!(
            "loaded {} history entries from {}",
            history.len(),
            file_path.display()
        );
        Ok(history)
    }

    pub fn save(&self, file_path: &Path) -> Result<(), HistoryError> {
        file_ops::write_lines(file_path, self.iter())?;
        log::debug!(
            "saved {} history entries to {}",
            self.len(),
            file_path.display()
        );
        Ok(())
    }

    pub fn record(&mut self, path: impl Into<PathBuf>) {
        self.slots[self.tail] = Some(path.into());
        if self.full {
            self.head = (self.head + 1) % CAPACITY;
        }
        self.tail = (self.tail + 1) % CAPACITY;
        if self.tail == self.head {
            self.full = true;
        }
    }

    pub fn len(&self) -> usize {
        if self.full {
            CAPACITY
        } else {
            (self.tail + CAPACITY - self.head) % CAPACITY
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Path> + '_ {
        (0..self.len()).filter_map(move |offset| {
            self.slots[(self.head + offset) % CAPACITY].as_deref()
        })
    }

    /// `(index, path)` pairs, 1-based, oldest first.
    pub fn list(&self) -> Vec<(usize, &Path)> {
        self.iter().enumerate().map(|(i, p)| (i + 1, p)).collect()
    }

    /// Resolves a selection typed at the `cdh` prompt: `3` or `c`.
    pub fn select(&self, key: &str) -> Result<&Path, HistoryError> {
        let index = parse_key(key)?;
        if index == 0 || index > self.len() {
            return Err(HistoryError::OutOfRange(index));
        }
        self.iter()
            .nth(index - 1)
            .ok_or(HistoryError::OutOfRange(index))
    }
}

/// Letter label shown next to the numeric index in `cdh` listings.
pub fn letter_for(index: usize) -> char {
    match u8::try_from(index) {
        Ok(i @ 1..=26) => (b'a' + i - 1) as char,
        _ => '?',
    }
}

fn parse_key(key: &str) -> Result<usize, HistoryError> {
    let key = key.trim();
    if let Ok(index) = key.parse::<usize>() {
        return Ok(index);
    }

    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Ok((c.to_ascii_lowercase() as u8 - b'a') as usize + 1)
        }
        _ => Err(HistoryError::InvalidKey(key.to_string())),
    }
}
