mod play;
mod playlist;
mod scan;
mod settings;

pub use play::PlayCommand;
pub use playlist::{AddCommand, ListCommand, RemoveCommand};
pub use scan::ScanCommand;
pub use settings::ConfigCommand;

use crate::cli::Commands;
use anyhow::Result;

/// Every CLI command implements this trait.
///
/// Commands own their arguments and are consumed on execution; they run exactly once.
pub trait CliCommand {
    fn execute(self: Box<Self>) -> Result<()>;
}

/// Converts a parsed [`Commands`] variant into a boxed [`CliCommand`] ready to execute.
pub fn from_cli(cmd: Commands) -> Box<dyn CliCommand> {
    match cmd {
        Commands::Play {
            inputs,
            playlist,
            mode,
            volume,
        } => Box::new(PlayCommand {
            inputs,
            playlist,
            mode,
            volume,
        }),
        Commands::Scan { directory, output } => Box::new(ScanCommand { directory, output }),
        Commands::Add { playlist, files } => Box::new(AddCommand { playlist, files }),
        Commands::Remove { playlist, index } => Box::new(RemoveCommand { playlist, index }),
        Commands::List { playlist } => Box::new(ListCommand { playlist }),
        Commands::Config {
            media_dir,
            volume,
            mode,
            poll_interval_ms,
        } => Box::new(ConfigCommand {
            media_dir,
            volume,
            mode,
            poll_interval_ms,
        }),
    }
}
