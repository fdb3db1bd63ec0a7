mod commands;

use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use markwav::cli::{Cli, Commands, ConfigCommands};
use markwav::Config;

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "MARKWAV_LOG";

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Convert(args) => {
            let config = Config::load()?;
            commands::convert::handle(&args, &config)
        }
        Commands::Columns { file } => commands::columns::handle(&file),
        Commands::Inspect { file, json, fps } => commands::inspect::handle(&file, json, fps),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::handle_show(),
            ConfigCommands::Path => commands::config::handle_path(),
            ConfigCommands::Init { force } => commands::config::handle_init(force),
        },
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "markwav", &mut io::stdout());
            Ok(())
        }
    }
}
