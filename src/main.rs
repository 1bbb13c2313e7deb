use shellfyre::core::config::{Config, SYSNAME};
use shellfyre::flags::Flags;
use shellfyre::shell::Shell;
use std::env;

fn main() -> Result<(), shellfyre::error::ShellError> {
    let mut flags = Flags::new();
    let args: Vec<String> = env::args().skip(1).collect();
    flags.parse(&args)?;

    if flags.is_set("help") {
        flags.print_help();
        return Ok(());
    }

    if flags.is_set("version") {
        println!("{} {}", SYSNAME, env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let starting_dir = env::current_dir()?;
    let config = Config::from_flags(&flags, &starting_dir);

    let default_level = if config.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let mut shell = Shell::new(config)?;
    shell.run()
}
