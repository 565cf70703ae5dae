use crate::core::events::StatusEvent;
use crate::core::models::{PlayMode, Track};
use crate::modules::playback::playback_progress::PlaybackProgress;
use crate::modules::storage::settings::DEFAULT_VOLUME;

/// What the shell knows about the player, rebuilt from status events only.
#[derive(Debug, Clone, Default)]
pub struct ShellState {
    pub playlist: PlaylistView,
    pub playback: PlaybackView,
    pub ui: UiState,
}

#[derive(Debug, Clone, Default)]
pub struct PlaylistView {
    pub tracks: Vec<Track>,
    pub cursor: usize,
}

#[derive(Debug, Clone)]
pub struct PlaybackView {
    /// Index of the track on the device, if any
    pub now_playing: Option<usize>,
    pub is_playing: bool,
    pub is_paused: bool,
    pub mode: PlayMode,
    pub volume: u8,
    pub progress: Option<PlaybackProgress>,
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub status_message: String,
    pub error_message: Option<String>,
}

impl Default for PlaybackView {
    fn default() -> Self {
        Self {
            now_playing: None,
            is_playing: false,
            is_paused: false,
            mode: PlayMode::default(),
            volume: DEFAULT_VOLUME,
            progress: None,
        }
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            status_message: "Welcome".to_string(),
            error_message: None,
        }
    }
}

impl ShellState {
    /// Update state based on a status event
    pub fn apply(&mut self, event: &StatusEvent) {
        match event {
            StatusEvent::Message(text) => {
                self.ui.status_message = text.clone();
                self.ui.error_message = None;
            }
            StatusEvent::Error(text) => {
                self.ui.error_message = Some(text.clone());
            }
            StatusEvent::NowPlaying { index, .. } => {
                self.playlist.cursor = *index;
                self.playback.now_playing = Some(*index);
                self.playback.is_playing = true;
                self.playback.is_paused = false;
            }
            StatusEvent::Paused => {
                self.playback.is_playing = false;
                self.playback.is_paused = true;
            }
            StatusEvent::Stopped => {
                self.playback.now_playing = None;
                self.playback.is_playing = false;
                self.playback.is_paused = false;
                self.playback.progress = None;
            }
            StatusEvent::Progress(progress) => {
                self.playback.progress = Some(*progress);
            }
            StatusEvent::CursorMoved { index } => {
                self.playlist.cursor = *index;
            }
            StatusEvent::PlaylistChanged {
                tracks,
                cursor,
                now_playing,
            } => {
                self.playlist.tracks = tracks.clone();
                self.playlist.cursor = *cursor;
                self.playback.now_playing = *now_playing;
            }
            StatusEvent::ModeChanged { mode } => {
                self.playback.mode = *mode;
            }
            StatusEvent::VolumeChanged { percent } => {
                self.playback.volume = *percent;
            }
        }
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.playlist.tracks.get(self.playlist.cursor)
    }

    pub fn is_empty(&self) -> bool {
        self.playlist.tracks.is_empty()
    }

    /// Short label for the transport state
    pub fn transport_label(&self) -> &'static str {
        if self.playback.is_playing {
            "Playing"
        } else if self.playback.is_paused {
            "Paused"
        } else {
            "Stopped"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn tracks(names: &[&str]) -> Vec<Track> {
        names.iter().map(|name| Track::from(*name)).collect()
    }

    #[test]
    fn now_playing_then_stop() {
        let mut state = ShellState::default();
        state.apply(&StatusEvent::PlaylistChanged {
            tracks: tracks(&["a.mp3", "b.mp3"]),
            cursor: 0,
            now_playing: None,
        });
        state.apply(&StatusEvent::NowPlaying {
            index: 1,
            track: Track::from("b.mp3"),
        });
        assert_eq!(state.playlist.cursor, 1);
        assert_eq!(state.transport_label(), "Playing");
        assert_eq!(state.selected_track(), Some(&Track::from("b.mp3")));

        state.apply(&StatusEvent::Progress(PlaybackProgress::new(
            0.5,
            Some(Duration::from_secs(10)),
        )));
        assert!(state.playback.progress.is_some());

        state.apply(&StatusEvent::Stopped);
        assert_eq!(state.transport_label(), "Stopped");
        assert!(state.playback.progress.is_none());
        assert!(state.playback.now_playing.is_none());
    }

    #[test]
    fn message_clears_previous_error() {
        let mut state = ShellState::default();
        state.apply(&StatusEvent::Error("File not found: x".into()));
        assert!(state.ui.error_message.is_some());

        state.apply(&StatusEvent::Message("Playlist cleared".into()));
        assert!(state.ui.error_message.is_none());
        assert_eq!(state.ui.status_message, "Playlist cleared");
    }

    #[test]
    fn pause_and_settings_changes() {
        let mut state = ShellState::default();
        state.apply(&StatusEvent::Paused);
        assert_eq!(state.transport_label(), "Paused");

        state.apply(&StatusEvent::ModeChanged {
            mode: PlayMode::Shuffle,
        });
        state.apply(&StatusEvent::VolumeChanged { percent: 0 });
        assert_eq!(state.playback.mode, PlayMode::Shuffle);
        assert_eq!(state.playback.volume, 0);
    }

    #[test]
    fn cursor_moves_without_playback() {
        let mut state = ShellState::default();
        state.apply(&StatusEvent::PlaylistChanged {
            tracks: tracks(&["a.mp3", "b.mp3", "c.mp3"]),
            cursor: 0,
            now_playing: None,
        });
        state.apply(&StatusEvent::CursorMoved { index: 2 });
        assert_eq!(state.playlist.cursor, 2);
        assert!(state.playback.now_playing.is_none());
    }

    #[test]
    fn playlist_change_keeps_marker_apart_from_cursor() {
        let mut state = ShellState::default();
        state.apply(&StatusEvent::PlaylistChanged {
            tracks: tracks(&["a.mp3", "b.mp3", "c.mp3"]),
            cursor: 0,
            now_playing: None,
        });
        state.apply(&StatusEvent::NowPlaying {
            index: 0,
            track: Track::from("a.mp3"),
        });
        state.apply(&StatusEvent::Paused);
        state.apply(&StatusEvent::CursorMoved { index: 2 });

        state.apply(&StatusEvent::PlaylistChanged {
            tracks: tracks(&["a.mp3", "c.mp3"]),
            cursor: 1,
            now_playing: Some(0),
        });
        assert_eq!(state.playlist.cursor, 1);
        assert_eq!(state.playback.now_playing, Some(0));

        state.apply(&StatusEvent::PlaylistChanged {
            tracks: tracks(&["c.mp3"]),
            cursor: 0,
            now_playing: None,
        });
        assert!(state.playback.now_playing.is_none());
    }
}
