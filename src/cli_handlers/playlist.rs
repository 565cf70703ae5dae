use crate::cli_handlers::CliCommand;
use crate::core::traits::SettingsStore;
use crate::modules::library::playlist::Playlist;
use crate::modules::library::scanner;
use crate::modules::storage::json_backend::JsonStorageBackend;
use crate::modules::storage::playlist_file;
use crate::modules::ui::terminal::renderer::TerminalRenderer;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

// ── Add ───────────────────────────────────────────────────────────────────────
pub struct AddCommand {
    pub playlist: PathBuf,
    pub files: Vec<PathBuf>,
}

impl CliCommand for AddCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        let settings = JsonStorageBackend::new()?.load()?;
        let ui = TerminalRenderer::new();

        let mut playlist = playlist_file::load_or_new(&self.playlist)?;
        let added = playlist.add(scanner::expand_inputs(&self.files, settings.scan_depth)?);

        if added > 0 {
            playlist_file::save_playlist(&self.playlist, &playlist)?;
        }
        ui.print_message(&format!("Added {} items to playlist", added));

        Ok(())
    }
}

// ── Remove ────────────────────────────────────────────────────────────────────
pub struct RemoveCommand {
    pub playlist: PathBuf,
    pub index: usize,
}

impl CliCommand for RemoveCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        let ui = TerminalRenderer::new();

        let mut playlist = Playlist::new();
        playlist_file::load_playlist(&self.playlist, &mut playlist)?;
        let removed = playlist.remove_at(self.index)?;

        // An empty playlist cannot be saved, so the file goes with its last entry.
        if playlist.is_empty() {
            fs::remove_file(&self.playlist)
                .with_context(|| format!("Failed to remove {}", self.playlist.display()))?;
            ui.print_message(&format!(
                "Removed {}; playlist is now empty and {} was deleted",
                removed,
                self.playlist.display()
            ));
        } else {
            playlist_file::save_playlist(&self.playlist, &playlist)?;
            ui.print_message(&format!("Removed {}", removed));
        }

        Ok(())
    }
}

// ── List ──────────────────────────────────────────────────────────────────────
pub struct ListCommand {
    pub playlist: PathBuf,
}

impl CliCommand for ListCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        let ui = TerminalRenderer::new();

        let mut playlist = Playlist::new();
        playlist_file::load_playlist(&self.playlist, &mut playlist)?;

        if playlist.is_empty() {
            ui.print_message("Playlist is empty");
        } else {
            ui.print_track_list(playlist.tracks());
        }

        Ok(())
    }
}
