use crate::core::models::PlayMode;
use crate::utils::APP_NAME;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_VOLUME: u8 = 80;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Persisted user settings. Missing fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory scanned at startup; platform music directory when unset
    pub media_dir: Option<PathBuf>,
    pub volume: u8,
    pub mode: PlayMode,
    pub poll_interval_ms: u64,
    /// 1 scans only the directory itself
    pub scan_depth: usize,
    /// Durable error log; `<data_dir>/playdeck/error.log` when unset
    pub error_log: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            media_dir: None,
            volume: DEFAULT_VOLUME,
            mode: PlayMode::Sequential,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            scan_depth: 1,
            error_log: None,
        }
    }
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn error_log_path(&self) -> Option<PathBuf> {
        self.error_log
            .clone()
            .or_else(|| data_dir().map(|dir| dir.join("error.log")))
    }
}

/// Per-user data directory for logs.
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(APP_NAME))
}
