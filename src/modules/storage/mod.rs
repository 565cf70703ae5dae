pub mod error_log;
pub mod json_backend;
pub mod playlist_file;
pub mod settings;
