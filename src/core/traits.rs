use crate::application::state::ShellState;
use crate::core::events::{Command, EventSender};
use crate::core::models::MediaHandle;
use crate::modules::storage::settings::Settings;
use anyhow::Result;
use std::path::Path;
use std::time::Duration;

/// Abstraction for the media playback device.
///
/// The device owns decoding and output; the controller only issues commands
/// and listens for end-of-media notifications.
pub trait PlaybackDevice {
    /// Load a media file, replacing whatever was loaded before.
    fn load_media(&mut self, path: &Path) -> Result<MediaHandle>;

    /// Start or resume playback of the loaded media
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    fn stop(&mut self);

    /// Check if media is currently audible (loaded, not paused, not finished)
    fn is_playing(&self) -> bool;

    /// Playback position as a fraction of the media length (0.0 - 1.0)
    fn position(&self) -> f64;

    /// Total media length, when the decoder knows it
    fn length(&self) -> Option<Duration>;

    /// Seek to a fraction of the media length (0.0 - 1.0)
    fn set_position(&mut self, fraction: f64) -> Result<()>;

    /// Set volume (0 - 100)
    fn set_volume(&mut self, percent: u8);

    /// Register where end-of-media notifications are delivered.
    ///
    /// Notifications may be sent from a thread owned by the device.
    fn on_end_reached(&mut self, notifier: EventSender);
}

/// Abstraction for persistent settings
pub trait SettingsStore: Send {
    fn load(&self) -> Result<Settings>;

    fn save(&self, settings: &Settings) -> Result<()>;
}

/// Input gathered by the shell in one poll.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellInput {
    Command(Command),
    /// Status text produced by the shell itself
    Notice(String),
    Quit,
}

/// Abstraction for UI rendering
pub trait UiRenderer {
    /// Initialize the UI (setup terminal, etc.)
    fn init(&mut self) -> Result<()>;

    /// Cleanup the UI (restore terminal, etc.)
    fn cleanup(&mut self) -> Result<()>;

    /// Render current state
    fn render(&mut self, state: &ShellState) -> Result<()>;

    /// Poll for user input (non-blocking)
    fn poll_input(&mut self, state: &ShellState) -> Result<Vec<ShellInput>>;
}
