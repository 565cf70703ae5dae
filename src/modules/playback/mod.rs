#[cfg(test)]
pub mod mock_device;
pub mod play_mode;
pub mod playback_progress;
pub mod progress_timer;
pub mod rodio_backend;
