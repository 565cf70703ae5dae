use crate::core::traits::SettingsStore;
use crate::modules::storage::settings::Settings;
use crate::utils::APP_NAME;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub struct JsonStorageBackend {
    file_path: PathBuf,
}

impl JsonStorageBackend {
    pub fn new() -> Result<Self> {
        let mut path = dirs::config_dir().context("Could not find config directory")?;
        path.push(APP_NAME);

        fs::create_dir_all(&path)?;

        path.push("settings.json");
        Ok(Self { file_path: path })
    }

    /// Backend reading and writing an explicit file.
    pub fn at(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.file_path
    }
}

impl SettingsStore for JsonStorageBackend {
    fn load(&self) -> Result<Settings> {
        if !self.file_path.exists() {
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(&self.file_path)
            .with_context(|| format!("Failed to read {}", self.file_path.display()))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings file {}", self.file_path.display()))?;
        Ok(settings)
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.file_path, content)
            .with_context(|| format!("Failed to write {}", self.file_path.display()))?;
        Ok(())
    }
}
