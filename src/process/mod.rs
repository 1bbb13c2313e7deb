use std::io;

use thiserror::Error;

pub mod channel;
pub mod executor;
pub mod jobs;
pub mod signal;

pub use executor::ProcessExecutor;
pub use jobs::{FinishedJob, JobTable};

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("{0}: command not found")]
    CommandNotFound(String),
    #[error("{name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("{path}: {source}")]
    Redirect {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("signal error: {0}")]
    Signal(String),
    #[error("result channel: {0}")]
    Channel(String),
    /// The worker already printed why it gave up.
    #[error("worker {0} reported a failure")]
    WorkerFailed(i32),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<ctrlc::Error> for ProcessError {
    fn from(err: ctrlc::Error) -> Self {
        ProcessError::Signal(err.to_string())
    }
}
