use crate::cli_handlers::CliCommand;
use crate::core::models::PlayMode;
use crate::core::traits::SettingsStore;
use crate::modules::storage::json_backend::JsonStorageBackend;
use crate::modules::storage::settings::Settings;
use crate::modules::ui::terminal::renderer::TerminalRenderer;
use anyhow::Result;
use std::path::PathBuf;

pub struct ConfigCommand {
    pub media_dir: Option<PathBuf>,
    pub volume: Option<u8>,
    pub mode: Option<PlayMode>,
    pub poll_interval_ms: Option<u64>,
}

impl ConfigCommand {
    /// Apply the requested changes. Returns whether anything changed.
    fn apply(&self, settings: &mut Settings) -> Result<bool> {
        let mut changed = false;

        if let Some(dir) = &self.media_dir {
            let path = dir.canonicalize()?;
            if !path.is_dir() {
                anyhow::bail!("The path provided is not a valid directory.");
            }
            settings.media_dir = Some(path);
            changed = true;
        }
        if let Some(volume) = self.volume {
            settings.volume = volume.min(100);
            changed = true;
        }
        if let Some(mode) = self.mode {
            settings.mode = mode;
            changed = true;
        }
        if let Some(interval) = self.poll_interval_ms {
            if interval == 0 {
                anyhow::bail!("The poll interval must be at least 1 ms.");
            }
            settings.poll_interval_ms = interval;
            changed = true;
        }

        Ok(changed)
    }
}

impl CliCommand for ConfigCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        let storage = JsonStorageBackend::new()?;
        let mut settings = storage.load()?;
        let ui = TerminalRenderer::new();

        if self.apply(&mut settings)? {
            storage.save(&settings)?;
            ui.print_message(&format!("Settings saved to {}", storage.path().display()));
        }

        let media_dir = settings
            .media_dir
            .as_ref()
            .map(|dir| dir.display().to_string())
            .unwrap_or_else(|| "(platform default)".to_string());
        ui.print_message(&format!("Media directory: {}", media_dir));
        ui.print_message(&format!("Volume: {}%", settings.volume));
        ui.print_message(&format!("Play mode: {}", settings.mode));
        ui.print_message(&format!("Poll interval: {} ms", settings.poll_interval_ms));

        Ok(())
    }
}
