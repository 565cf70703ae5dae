use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A reference to one playable media file.
///
/// Tracks are compared by their exact string value; no normalisation of the
/// path happens, so `a/../b.mp3` and `b.mp3` are different tracks.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Track(String);

impl Track {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn from_path(path: &Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// File name shown in the playlist panel and status line.
    pub fn display_name(&self) -> String {
        self.path()
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.0)
            .to_string()
    }
}

impl From<PathBuf> for Track {
    fn from(path: PathBuf) -> Self {
        Self::from_path(&path)
    }
}

impl From<&str> for Track {
    fn from(locator: &str) -> Self {
        Self::new(locator)
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Policy governing how the cursor advances when a track ends or the user
/// skips forward.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PlayMode {
    #[default]
    Sequential,
    RepeatAll,
    RepeatOne,
    Shuffle,
}

impl PlayMode {
    pub const ALL: [PlayMode; 4] = [
        PlayMode::Sequential,
        PlayMode::RepeatAll,
        PlayMode::RepeatOne,
        PlayMode::Shuffle,
    ];

    /// The mode after this one in selector order, wrapping around.
    pub fn cycle(self) -> Self {
        match self {
            PlayMode::Sequential => PlayMode::RepeatAll,
            PlayMode::RepeatAll => PlayMode::RepeatOne,
            PlayMode::RepeatOne => PlayMode::Shuffle,
            PlayMode::Shuffle => PlayMode::Sequential,
        }
    }
}

impl fmt::Display for PlayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlayMode::Sequential => "Sequential",
            PlayMode::RepeatAll => "Repeat All",
            PlayMode::RepeatOne => "Repeat One",
            PlayMode::Shuffle => "Shuffle",
        };
        write!(f, "{}", label)
    }
}

/// Transient playback session state, reconciled against the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Identifies one media load on the playback device.
///
/// End-of-media notifications carry the handle of the media that ended so
/// the controller can drop notifications for media it already replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaHandle(pub u64);
