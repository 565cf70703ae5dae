use crate::core::models::{MediaHandle, PlayMode, Track};
use crate::modules::playback::playback_progress::PlaybackProgress;
use std::path::PathBuf;

/// Everything the controller reacts to, delivered on one queue.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A request from the user interface
    Command(Command),

    /// A notification from the playback device
    Device(DeviceEvent),

    /// Stop the controller loop
    Shutdown,
}

/// User-facing commands exposed to the shell.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Append media files, skipping ones already present
    AddMedia { paths: Vec<PathBuf> },

    /// Replace the playlist with media found in a directory
    ScanDirectory { dir: PathBuf },

    /// Remove the entry at the selected index
    RemoveSelected { index: usize },

    ClearAll,

    /// Play/pause
    Toggle,

    Stop,

    Next,

    Previous,

    /// Move the cursor to an entry and play it
    PlaySelected { index: usize },

    SelectMode { mode: PlayMode },

    /// Seek to a fraction of the current media (0.0 - 1.0)
    Seek { fraction: f64 },

    /// Set volume (0 - 100)
    SetVolume { percent: u8 },

    Save { path: PathBuf },

    Load { path: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    /// The media identified by `handle` played to its end
    EndReached { handle: MediaHandle },
}

/// Outward status channel consumed by the shell.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    /// Plain status-bar text
    Message(String),

    /// A failure the user should see
    Error(String),

    /// Playback of the track at `index` started
    NowPlaying { index: usize, track: Track },

    Paused,

    Stopped,

    /// Position update while playing
    Progress(PlaybackProgress),

    /// Cursor moved without starting playback
    CursorMoved { index: usize },

    /// Playlist contents changed; `now_playing` is the loaded entry's new index
    PlaylistChanged {
        tracks: Vec<Track>,
        cursor: usize,
        now_playing: Option<usize>,
    },

    ModeChanged { mode: PlayMode },

    VolumeChanged { percent: u8 },
}

/// Type alias for event sender
pub type EventSender = crossbeam_channel::Sender<AppEvent>;

/// Type alias for event receiver
pub type EventReceiver = crossbeam_channel::Receiver<AppEvent>;

pub type StatusSender = crossbeam_channel::Sender<StatusEvent>;

pub type StatusReceiver = crossbeam_channel::Receiver<StatusEvent>;
