use crate::core::models::Track;
use crate::utils::is_media_file;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Outcome of scanning a media directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Found(Vec<Track>),
    /// The directory exists but holds no recognised media
    Empty,
    /// The directory does not exist
    Missing,
}

/// Collect media files under `root`, sorted by file name.
///
/// `max_depth` of 1 looks at the directory's direct children only.
pub fn scan_directory(root: &Path, max_depth: usize) -> Result<Vec<Track>> {
    let mut tracks = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth.max(1))
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to read {}", root.display()))?;
        if entry.file_type().is_file() && is_media_file(entry.path()) {
            tracks.push(Track::from_path(entry.path()));
        }
    }

    Ok(tracks)
}

/// Scan the startup media directory, classifying the non-fatal outcomes.
pub fn scan_media_directory(root: &Path, max_depth: usize) -> Result<ScanOutcome> {
    if !root.is_dir() {
        return Ok(ScanOutcome::Missing);
    }

    let tracks = scan_directory(root, max_depth)?;
    if tracks.is_empty() {
        Ok(ScanOutcome::Empty)
    } else {
        Ok(ScanOutcome::Found(tracks))
    }
}

/// Expand command-line inputs: files are kept as given, directories are scanned.
pub fn expand_inputs(inputs: &[PathBuf], max_depth: usize) -> Result<Vec<Track>> {
    let mut tracks = Vec::new();
    for input in inputs {
        if input.is_dir() {
            tracks.extend(scan_directory(input, max_depth)?);
        } else {
            tracks.push(Track::from_path(input));
        }
    }
    Ok(tracks)
}

/// Platform music directory, falling back to `~/Music`.
///
/// Without a home directory the literal `~/Music` is returned so the scan
/// still runs and reports the directory as missing.
pub fn default_media_dir() -> PathBuf {
    dirs::audio_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Music")))
        .unwrap_or_else(|| PathBuf::from("~/Music"))
}
