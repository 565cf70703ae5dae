use crate::core::error::PlayerError;
use crate::core::models::Track;

/// The user's ordered working set of tracks plus the playback cursor.
///
/// - Order is insertion order and drives sequential/repeat traversal
/// - `add` never inserts a track value that is already present; a loaded
///   file is taken as written and may repeat entries
/// - The cursor is in `[0, len-1]` when non-empty and `0` when empty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    tracks: Vec<Track>,
    cursor: usize,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a playlist from tracks, dropping duplicates after their first occurrence.
    pub fn from_tracks(tracks: impl IntoIterator<Item = Track>) -> Self {
        let mut playlist = Self::new();
        playlist.add(tracks);
        playlist
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Track under the cursor, `None` when the playlist is empty.
    pub fn current(&self) -> Option<&Track> {
        self.tracks.get(self.cursor)
    }

    pub fn set_cursor(&mut self, index: usize) -> Result<(), PlayerError> {
        self.check_index(index)?;
        self.cursor = index;
        Ok(())
    }

    /// Append every track not already present. Returns how many were added.
    pub fn add(&mut self, tracks: impl IntoIterator<Item = Track>) -> usize {
        let before = self.tracks.len();
        for track in tracks {
            if !self.tracks.contains(&track) {
                self.tracks.push(track);
            }
        }
        self.tracks.len() - before
    }

    /// Remove the entry at `index`, keeping the cursor on a live entry.
    ///
    /// Removing an entry before the cursor shifts the cursor down so it keeps
    /// pointing at the same track. Removing the cursor entry leaves the cursor
    /// on whatever slid into its place (or the new last entry).
    pub fn remove_at(&mut self, index: usize) -> Result<Track, PlayerError> {
        self.check_index(index)?;
        let removed = self.tracks.remove(index);

        if index < self.cursor {
            self.cursor -= 1;
        }
        self.cursor = self.cursor.min(self.tracks.len().saturating_sub(1));

        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.cursor = 0;
    }

    /// Replace the whole playlist with a serialized flat list of paths.
    ///
    /// The playlist is left untouched when the input is malformed. Entries
    /// are kept verbatim, duplicates included, since the file is the user's
    /// own ordering.
    pub fn load_from(&mut self, serialized: &str) -> Result<(), PlayerError> {
        let tracks: Vec<Track> = serde_json::from_str(serialized).map_err(PlayerError::Format)?;
        self.tracks = tracks;
        self.cursor = 0;
        Ok(())
    }

    /// Serialize the ordered list of paths as a flat JSON array.
    pub fn save_to(&self) -> Result<String, PlayerError> {
        if self.tracks.is_empty() {
            return Err(PlayerError::EmptyPlaylist);
        }
        serde_json::to_string_pretty(&self.tracks).map_err(PlayerError::Format)
    }

    fn check_index(&self, index: usize) -> Result<(), PlayerError> {
        if index < self.tracks.len() {
            Ok(())
        } else {
            Err(PlayerError::Index {
                index,
                len: self.tracks.len(),
            })
        }
    }
}
