use thiserror::Error;

use crate::core::commands::CommandError;
use crate::core::config::ConfigError;
use crate::history::HistoryError;
use crate::path::PathError;
use crate::process::ProcessError;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Path(#[from] PathError),
}
