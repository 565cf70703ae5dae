use crate::application::app::{Application, PlayerHandle};
use crate::cli_handlers::CliCommand;
use crate::core::events::Command;
use crate::core::models::PlayMode;
use crate::core::traits::{PlaybackDevice, SettingsStore};
use crate::modules::library::playlist::Playlist;
use crate::modules::library::scanner;
use crate::modules::playback::rodio_backend::RodioDevice;
use crate::modules::storage::json_backend::JsonStorageBackend;
use crate::modules::storage::playlist_file;
use crate::modules::ui::terminal::renderer::TerminalRenderer;
use crate::modules::storage::settings::Settings;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

pub struct PlayCommand {
    pub inputs: Vec<PathBuf>,
    pub playlist: Option<PathBuf>,
    pub mode: Option<PlayMode>,
    pub volume: Option<u8>,
}

impl CliCommand for PlayCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        let storage = JsonStorageBackend::new()?;
        let mut settings = storage.load()?;
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        if let Some(volume) = self.volume {
            settings.volume = volume;
        }

        let mut initial = match &self.playlist {
            Some(path) => playlist_file::load_or_new(path)
                .with_context(|| format!("Failed to open playlist {}", path.display()))?,
            None => Playlist::new(),
        };
        initial.add(scanner::expand_inputs(&self.inputs, settings.scan_depth)?);
        let scan_default = self.inputs.is_empty() && self.playlist.is_none();

        info!(tracks = initial.len(), mode = %settings.mode, "starting session");
        let player = PlayerHandle::spawn(
            Box::new(|| Ok(Box::new(RodioDevice::new()?) as Box<dyn PlaybackDevice>)),
            settings.clone(),
            initial,
        )?;

        if scan_default {
            player.send(Command::ScanDirectory {
                dir: startup_directory(&settings),
            })?;
        }

        let mut renderer = TerminalRenderer::new();
        if let Some(path) = self.playlist {
            renderer = renderer.with_save_path(path);
        }

        let mut app = Application::new(player, settings)
            .with_storage_backend(Box::new(storage))
            .with_ui_renderer(Box::new(renderer));

        app.run()
    }
}

/// Directory scanned when `play` starts with nothing to play.
fn startup_directory(settings: &Settings) -> PathBuf {
    settings
        .media_dir
        .clone()
        .unwrap_or_else(scanner::default_media_dir)
}
