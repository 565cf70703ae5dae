use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::models::PlayMode;
use crate::utils::APP_NAME;

#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(about = "Terminal playlist player with play modes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive playback session
    Play {
        /// Media files or directories; the default media directory when empty
        inputs: Vec<PathBuf>,

        /// Playlist file to load at startup and save to with `s`
        #[arg(short, long)]
        playlist: Option<PathBuf>,

        /// Play mode for this session
        #[arg(short, long, value_enum)]
        mode: Option<PlayMode>,

        /// Volume for this session (0-100)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
        volume: Option<u8>,
    },

    /// List the media found in a directory
    Scan {
        /// Directory to scan; the default media directory when omitted
        directory: Option<PathBuf>,

        /// Save the result as a playlist file instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Add files to a playlist file, creating it if needed
    Add {
        playlist: PathBuf,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Remove the entry at INDEX from a playlist file
    Remove { playlist: PathBuf, index: usize },

    /// Print the entries of a playlist file
    List { playlist: PathBuf },

    /// Show settings, or update the ones given
    Config {
        /// Directory scanned when `play` gets no inputs
        #[arg(long)]
        media_dir: Option<PathBuf>,

        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        volume: Option<u8>,

        #[arg(long, value_enum)]
        mode: Option<PlayMode>,

        /// Progress refresh interval while playing
        #[arg(long)]
        poll_interval_ms: Option<u64>,
    },
}
