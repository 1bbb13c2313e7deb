mod expander;
mod resolver;

pub use expander::PathExpander;
pub use resolver::PathResolver;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("home directory not found")]
    HomeDirNotFound,
}
