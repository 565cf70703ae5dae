mod application;
mod cli;
mod cli_handlers;
mod core;
mod logging;
mod modules;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands still work when the log directory is unwritable.
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: logging disabled: {:#}", e);
    }

    cli_handlers::from_cli(cli.command).execute()
}
