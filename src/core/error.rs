use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the playlist store and the playback controller.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The referenced media file does not exist at play time.
    #[error("File not found: {}", .0.display())]
    TrackNotFound(PathBuf),

    /// A persisted playlist is not a JSON array of path strings.
    #[error("Malformed playlist: {0}")]
    Format(#[source] serde_json::Error),

    #[error("Playlist is empty")]
    EmptyPlaylist,

    /// Caller referenced an entry that does not exist.
    #[error("Index {index} is out of range for a playlist of {len} tracks")]
    Index { index: usize, len: usize },

    /// Opaque failure reported by the playback device.
    #[error("Playback failed: {0:#}")]
    Device(anyhow::Error),

    #[error("Could not access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PlayerError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PlayerError::Io {
            path: path.into(),
            source,
        }
    }

    /// Errors worth a line in the durable error log.
    ///
    /// Misuse (`Index`) and the empty-save case are reported as status only.
    pub fn is_serious(&self) -> bool {
        !matches!(self, PlayerError::Index { .. } | PlayerError::EmptyPlaylist)
    }
}
