use std::path::{Path, PathBuf};

use thiserror::Error;

mod paths;

pub use paths::history_path;

use crate::flags::Flags;

/// Name the shell uses in prompts and error lines.
pub const SYSNAME: &str = "shellfyre";
pub const HISTORY_FILE: &str = "visitedPaths.txt";
pub const HISTORY_ENV: &str = "SHELLFYRE_HISTORY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("flag {0} requires a value")]
    MissingValue(String),
    #[error("unknown flag: {0}")]
    UnknownFlag(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub history_path: PathBuf,
    pub quiet: bool,
    pub debug: bool,
}

impl Config {
    pub fn from_flags(flags: &Flags, starting_dir: &Path) -> Self {
        let history_path = history_path(
            flags.get_value("history").map(String::as_str),
            std::env::var_os(HISTORY_ENV),
            starting_dir,
        );

        Config {
            history_path,
            quiet: flags.is_set("quiet"),
            debug: flags.is_set("debug"),
        }
    }
}
