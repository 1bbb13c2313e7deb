mod completer;
mod editor;
pub mod terminal;

pub use completer::{Candidate, ShellCompleter};
pub use editor::{LineEditor, LineResult, MAX_LINE};
