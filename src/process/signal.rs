use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use signal_hook::consts::SIGCHLD;

use crate::process::ProcessError;

/// Keeps Ctrl-C from terminating the shell itself. Foreground children
/// still receive the signal from the terminal.
pub fn setup_interrupt_handler(quiet: bool) -> Result<(), ProcessError> {
    ctrlc::set_handler(move || {
        if !quiet {
            println!("\nUse 'exit' to exit the shell");
        }
    })?;
    Ok(())
}

/// Returns a flag that is raised whenever a child process changes state.
pub fn watch_children() -> Result<Arc<AtomicBool>, ProcessError> {
    let flag = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGCHLD, Arc::clone(&flag))
        .map_err(|e| ProcessError::Signal(e.to_string()))?;
    Ok(flag)
}
