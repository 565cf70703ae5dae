pub const APP_NAME: &str = "playdeck";

/// Extensions picked up by directory scans (compared lowercase).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "mp4", "avi", "mkv", "wav", "mov", "flac", "ogg"];

/// Convert user volume percentage (0-100) to amplitude multiplier using perceptual scaling
///
/// Human hearing is logarithmic, so we use x^4 to approximate an exponential curve.
/// This provides a 60dB dynamic range, making volume changes feel more linear to human perception.
///
/// # Arguments
/// *`percent` - User input volume percentage (0-100)
///
/// # Returns
/// * `f32` - Amplitude multiplier (0.0-1.0)
pub fn volume_percent_to_amplitude(percent: u8) -> f32 {
    let x = (percent.min(100) as f32) / 100.0;
    x.powi(4)
}

/// Checks a path's extension against [`SUPPORTED_EXTENSIONS`].
pub fn is_media_file(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}
