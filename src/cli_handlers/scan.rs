use crate::cli_handlers::CliCommand;
use crate::core::traits::SettingsStore;
use crate::modules::library::playlist::Playlist;
use crate::modules::library::scanner::{self, ScanOutcome};
use crate::modules::storage::json_backend::JsonStorageBackend;
use crate::modules::storage::playlist_file;
use crate::modules::ui::terminal::renderer::TerminalRenderer;
use anyhow::Result;
use std::path::PathBuf;

pub struct ScanCommand {
    pub directory: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl CliCommand for ScanCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        let storage = JsonStorageBackend::new()?;
        let settings = storage.load()?;
        let ui = TerminalRenderer::new();

        let directory = self
            .directory
            .or(settings.media_dir)
            .unwrap_or_else(scanner::default_media_dir);

        match scanner::scan_media_directory(&directory, settings.scan_depth)? {
            ScanOutcome::Missing => {
                ui.print_error(&format!("Directory {} does not exist", directory.display()));
            }
            ScanOutcome::Empty => {
                ui.print_message(&format!("No media files found in {}", directory.display()));
            }
            ScanOutcome::Found(tracks) => match self.output {
                Some(output) => {
                    let playlist = Playlist::from_tracks(tracks);
                    playlist_file::save_playlist(&output, &playlist)?;
                    ui.print_message(&format!(
                        "Saved {} tracks to {}",
                        playlist.len(),
                        output.display()
                    ));
                }
                None => ui.print_track_list(&tracks),
            },
        }

        Ok(())
    }
}
