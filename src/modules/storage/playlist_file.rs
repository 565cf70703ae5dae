use crate::core::error::PlayerError;
use crate::modules::library::playlist::Playlist;
use std::fs;
use std::path::Path;

/// Replace `playlist` with the contents of a playlist file.
///
/// Read and format failures leave `playlist` unchanged.
pub fn load_playlist(path: &Path, playlist: &mut Playlist) -> Result<(), PlayerError> {
    let content = fs::read_to_string(path).map_err(|e| PlayerError::io(path, e))?;
    playlist.load_from(&content)
}

/// Write `playlist` to a file as a flat JSON array of paths.
pub fn save_playlist(path: &Path, playlist: &Playlist) -> Result<(), PlayerError> {
    let content = playlist.save_to()?;
    fs::write(path, content).map_err(|e| PlayerError::io(path, e))
}

/// Load a playlist file, or start empty when the file does not exist yet.
pub fn load_or_new(path: &Path) -> Result<Playlist, PlayerError> {
    let mut playlist = Playlist::new();
    if path.exists() {
        load_playlist(path, &mut playlist)?;
    }
    Ok(playlist)
}
