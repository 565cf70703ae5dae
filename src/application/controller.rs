use crate::core::error::PlayerError;
use crate::core::events::*;
use crate::core::models::{MediaHandle, PlayMode, SessionState, Track};
use crate::core::traits::PlaybackDevice;
use crate::modules::library::playlist::Playlist;
use crate::modules::library::scanner::{self, ScanOutcome};
use crate::modules::playback::play_mode::{Advance, compute_next, compute_previous};
use crate::modules::playback::playback_progress::PlaybackProgress;
use crate::modules::playback::progress_timer::ProgressTimer;
use crate::modules::storage::error_log::ErrorLog;
use crate::modules::storage::playlist_file;
use crate::modules::storage::settings::Settings;
use crossbeam_channel::select;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Owns the playlist, cursor and playback session, and drives the device.
///
/// Every mutation goes through `&mut self`; [`Controller::run`] pulls UI
/// commands and device notifications off one queue so they are applied one
/// at a time on the controller's thread.
pub struct Controller {
    playlist: Playlist,
    mode: PlayMode,
    session: SessionState,
    volume: u8,
    scan_depth: usize,

    /// Media currently on the device and the playlist index it came from
    loaded: Option<(MediaHandle, usize)>,

    device: Box<dyn PlaybackDevice>,
    progress: ProgressTimer,
    status_tx: StatusSender,
    error_log: ErrorLog,
    rng: StdRng,
}

impl Controller {
    /// Build a controller and register it for the device's end-of-media
    /// notifications on `event_tx`.
    pub fn new(
        mut device: Box<dyn PlaybackDevice>,
        settings: &Settings,
        event_tx: EventSender,
        status_tx: StatusSender,
    ) -> Self {
        device.on_end_reached(event_tx);
        device.set_volume(settings.volume.min(100));

        let error_log = settings
            .error_log_path()
            .map(ErrorLog::new)
            .unwrap_or_else(ErrorLog::disabled);

        Self {
            playlist: Playlist::new(),
            mode: settings.mode,
            session: SessionState::Stopped,
            volume: settings.volume.min(100),
            scan_depth: settings.scan_depth,
            loaded: None,
            device,
            progress: ProgressTimer::new(settings.poll_interval()),
            status_tx,
            error_log,
            rng: StdRng::seed_from_u64(rand::random()),
        }
    }

    pub fn with_playlist(mut self, playlist: Playlist) -> Self {
        self.playlist = playlist;
        self
    }

    /// Fix the shuffle sequence.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Process events until `Shutdown` arrives or every sender is gone.
    ///
    /// Position ticks are selected alongside the queue and only exist while
    /// the session is Playing.
    pub fn run(mut self, events: EventReceiver) {
        info!(tracks = self.playlist.len(), mode = %self.mode, "controller started");
        self.announce();

        loop {
            let ticks = self.progress.ticks().clone();
            select! {
                recv(events) -> event => match event {
                    Ok(event) => {
                        if !self.handle_event(event) {
                            break;
                        }
                    }
                    Err(_) => break,
                },
                recv(ticks) -> _ => self.report_progress(),
            }
        }

        self.shutdown();
    }

    /// Apply one event. Returns `false` once the controller should stop.
    pub fn handle_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Command(command) => self.dispatch(command),
            AppEvent::Device(DeviceEvent::EndReached { handle }) => self.on_end_reached(handle),
            AppEvent::Shutdown => return false,
        }
        true
    }

    /// Run a UI command, turning any failure into a status report.
    pub fn dispatch(&mut self, command: Command) {
        debug!(?command, "command received");

        let result = match command {
            Command::AddMedia { paths } => {
                self.add_media(paths);
                Ok(())
            }
            Command::ScanDirectory { dir } => {
                self.scan_directory(&dir);
                Ok(())
            }
            Command::RemoveSelected { index } => self.remove_selected(index),
            Command::ClearAll => {
                self.clear_all();
                Ok(())
            }
            Command::Toggle => {
                self.toggle();
                Ok(())
            }
            Command::Stop => {
                self.stop();
                Ok(())
            }
            Command::Next => {
                self.next();
                Ok(())
            }
            Command::Previous => {
                self.previous();
                Ok(())
            }
            Command::PlaySelected { index } => self.play_selected(index),
            Command::SelectMode { mode } => {
                self.select_mode(mode);
                Ok(())
            }
            Command::Seek { fraction } => {
                self.seek(fraction);
                Ok(())
            }
            Command::SetVolume { percent } => {
                self.set_volume(percent);
                Ok(())
            }
            Command::Save { path } => self.save(&path),
            Command::Load { path } => self.load(&path),
        };

        if let Err(err) = result {
            self.report_error(&err);
        }
    }

    // ── Playlist commands ─────────────────────────────────────────────────────

    /// Append new paths, skipping ones already in the playlist.
    pub fn add_media(&mut self, paths: Vec<PathBuf>) -> usize {
        if paths.is_empty() {
            self.message("No files selected");
            return 0;
        }

        let added = self.playlist.add(paths.into_iter().map(Track::from));
        info!(added, total = self.playlist.len(), "media added");
        self.playlist_changed();
        self.message(format!("Added {} items to playlist", added));
        added
    }

    /// Replace the playlist with the media found in the startup directory.
    ///
    /// A missing or empty directory is reported, not treated as an error.
    pub fn scan_directory(&mut self, dir: &Path) {
        match scanner::scan_media_directory(dir, self.scan_depth) {
            Ok(ScanOutcome::Found(tracks)) => {
                self.halt_if_active();
                self.playlist = Playlist::from_tracks(tracks);
                info!(dir = %dir.display(), found = self.playlist.len(), "directory scanned");
                self.playlist_changed();
                self.message(format!(
                    "Found {} media files in {}",
                    self.playlist.len(),
                    dir.display()
                ));
            }
            Ok(ScanOutcome::Empty) => {
                debug!(dir = %dir.display(), "no media in directory");
                self.message("No media files found in default directory");
            }
            Ok(ScanOutcome::Missing) => {
                debug!(dir = %dir.display(), "media directory missing");
                self.message("Default directory does not exist");
            }
            Err(e) => {
                let message = format!("Error loading playlist from {}: {:#}", dir.display(), e);
                error!(error = %message, "directory scan failed");
                self.error_log.append(&message);
                self.emit(StatusEvent::Error(message));
            }
        }
    }

    pub fn remove_selected(&mut self, index: usize) -> Result<(), PlayerError> {
        let track = self.playlist.get(index).cloned().ok_or(PlayerError::Index {
            index,
            len: self.playlist.len(),
        })?;

        // The cursor must not outlive the entry that is playing.
        if self.loaded_index() == Some(index) {
            self.halt();
        }

        self.playlist.remove_at(index)?;
        if let Some((_, loaded)) = &mut self.loaded {
            if index < *loaded {
                *loaded -= 1;
            }
        }
        info!(index, track = track.as_str(), "track removed");
        self.playlist_changed();
        self.message("Track removed from playlist");
        Ok(())
    }

    pub fn clear_all(&mut self) {
        if self.playlist.is_empty() {
            self.message("Playlist is already empty");
            return;
        }

        self.halt_if_active();
        self.playlist.clear();
        info!("playlist cleared");
        self.playlist_changed();
        self.message("Playlist cleared");
    }

    pub fn save(&mut self, path: &Path) -> Result<(), PlayerError> {
        playlist_file::save_playlist(path, &self.playlist)?;
        info!(path = %path.display(), tracks = self.playlist.len(), "playlist saved");
        self.message(format!("Playlist saved to {}", path.display()));
        Ok(())
    }

    /// Replace the playlist from a file; on failure nothing changes.
    pub fn load(&mut self, path: &Path) -> Result<(), PlayerError> {
        let mut loaded = self.playlist.clone();
        playlist_file::load_playlist(path, &mut loaded)?;

        self.halt_if_active();
        self.playlist = loaded;
        info!(path = %path.display(), tracks = self.playlist.len(), "playlist loaded");
        self.playlist_changed();

        if self.playlist.is_empty() {
            self.message("Loaded playlist is empty");
        } else {
            self.message(format!("Playlist loaded from {}", path.display()));
        }
        Ok(())
    }

    // ── Transport commands ────────────────────────────────────────────────────

    /// Pause when the device is playing, otherwise resume or start the cursor track.
    pub fn toggle(&mut self) {
        if self.playlist.is_empty() {
            self.message("No playlist loaded");
            return;
        }

        if self.device.is_playing() {
            self.device.pause();
            self.session = SessionState::Paused;
            self.progress.cancel();
            info!("playback paused");
            self.emit(StatusEvent::Paused);
            self.message("Paused");
            return;
        }

        if self.session == SessionState::Paused && self.cursor_is_loaded() {
            match self.device.play() {
                Ok(()) => {
                    self.session = SessionState::Playing;
                    self.progress.start();
                    info!("playback resumed");
                    self.announce_now_playing(self.playlist.cursor());
                    return;
                }
                Err(e) => self.report_error(&PlayerError::Device(e)),
            }
        }

        self.play_with_fallback(self.playlist.cursor());
    }

    pub fn stop(&mut self) {
        self.device.stop();
        self.session = SessionState::Stopped;
        self.loaded = None;
        self.progress.cancel();
        info!("playback stopped");
        self.emit(StatusEvent::Stopped);
        self.message("Playback stopped");
    }

    pub fn next(&mut self) {
        if self.playlist.is_empty() {
            self.message("Playlist is empty");
            return;
        }

        match compute_next(self.mode, self.playlist.cursor(), self.playlist.len(), &mut self.rng) {
            Advance::To(index) => self.move_cursor(index),
            Advance::EndOfPlaylist => {
                info!("end of playlist reached");
                self.stop();
            }
        }
    }

    /// Step back one entry, wrapping to the last track in every mode.
    pub fn previous(&mut self) {
        if self.playlist.is_empty() {
            self.message("Playlist is empty");
            return;
        }

        let index = compute_previous(self.playlist.cursor(), self.playlist.len());
        self.move_cursor(index);
    }

    /// Move the cursor to `index` and play it.
    pub fn play_selected(&mut self, index: usize) -> Result<(), PlayerError> {
        self.playlist.set_cursor(index)?;
        self.play_with_fallback(index);
        Ok(())
    }

    /// Switch mode; an active session restarts the current track.
    pub fn select_mode(&mut self, mode: PlayMode) {
        self.mode = mode;
        info!(%mode, "play mode changed");
        self.emit(StatusEvent::ModeChanged { mode });
        self.message(format!("Play mode changed to {}", mode));

        if self.session == SessionState::Playing {
            self.play_with_fallback(self.playlist.cursor());
        }
    }

    /// Seek within the current media. Ignored unless the device is playing.
    pub fn seek(&mut self, fraction: f64) {
        if !self.device.is_playing() {
            debug!(fraction, "seek ignored while not playing");
            return;
        }
        if fraction.is_nan() {
            return;
        }

        if let Err(e) = self.device.set_position(fraction.clamp(0.0, 1.0)) {
            self.report_error(&PlayerError::Device(e));
        }
    }

    pub fn set_volume(&mut self, percent: u8) {
        let percent = percent.min(100);
        self.device.set_volume(percent);
        self.volume = percent;
        debug!(percent, "volume set");

        self.emit(StatusEvent::VolumeChanged { percent });
        if percent == 0 {
            self.message("Muted");
        } else {
            self.message(format!("Volume: {}%", percent));
        }
    }

    // ── Playback ──────────────────────────────────────────────────────────────

    /// Play the entry at `index` once, with no fallback.
    ///
    /// The file must exist before it is handed to the device.
    pub fn play_track(&mut self, index: usize) -> Result<(), PlayerError> {
        let track = self.playlist.get(index).cloned().ok_or(PlayerError::Index {
            index,
            len: self.playlist.len(),
        })?;
        self.playlist.set_cursor(index)?;

        if !track.path().exists() {
            return Err(PlayerError::TrackNotFound(track.path().to_path_buf()));
        }

        self.loaded = None;
        let handle = self
            .device
            .load_media(track.path())
            .map_err(PlayerError::Device)?;
        self.loaded = Some((handle, index));
        self.device.play().map_err(PlayerError::Device)?;

        self.session = SessionState::Playing;
        self.progress.start();
        self.announce_now_playing(index);
        Ok(())
    }

    /// Play from `start`, skipping unplayable entries under the current mode.
    ///
    /// Each entry is tried at most once; Shuffle draws only among entries
    /// not tried yet. RepeatOne would retry the same entry, so it stops after
    /// the first failure.
    fn play_with_fallback(&mut self, start: usize) {
        let n = self.playlist.len();
        if n == 0 {
            return;
        }
        let mut failed = vec![false; n];
        let mut index = start;

        loop {
            let err = match self.play_track(index) {
                Ok(()) => return,
                Err(err) => err,
            };
            warn!(index, error = %err, "track failed to play");
            self.report_error(&err);
            failed[index] = true;

            let next = match self.mode {
                PlayMode::RepeatOne => {
                    self.stop();
                    return;
                }
                PlayMode::Shuffle => (0..n).filter(|&i| !failed[i]).choose(&mut self.rng),
                _ => match compute_next(self.mode, index, n, &mut self.rng) {
                    Advance::To(next) => Some(next).filter(|&i| !failed[i]),
                    Advance::EndOfPlaylist => {
                        self.stop();
                        return;
                    }
                },
            };

            match next {
                Some(next) => index = next,
                None => break,
            }
        }

        self.halt();
        let message = "No playable tracks in playlist".to_string();
        error!("{}", message);
        self.error_log.append(&message);
        self.emit(StatusEvent::Error(message));
    }

    /// Either play `index` (session Playing) or just select it.
    fn move_cursor(&mut self, index: usize) {
        if self.session == SessionState::Playing {
            self.play_with_fallback(index);
            return;
        }

        if let Err(err) = self.playlist.set_cursor(index) {
            self.report_error(&err);
            return;
        }
        self.emit(StatusEvent::CursorMoved { index });
        if let Some(track) = self.playlist.current() {
            let name = track.display_name();
            self.message(format!("Selected: {}", name));
        }
    }

    /// End-of-media from the device: advance like a user "next".
    fn on_end_reached(&mut self, handle: MediaHandle) {
        let current = self.loaded.as_ref().map(|(h, _)| *h);
        if current != Some(handle) || self.session != SessionState::Playing {
            debug!(?handle, ?current, "ignoring stale end-of-media");
            return;
        }

        debug!(?handle, "media ended");
        self.next();
    }

    /// Push a position update while playing.
    pub fn report_progress(&mut self) {
        if self.session != SessionState::Playing {
            self.progress.cancel();
            return;
        }

        let progress = PlaybackProgress::new(self.device.position(), self.device.length());
        self.emit(StatusEvent::Progress(progress));
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn loaded_index(&self) -> Option<usize> {
        self.loaded.map(|(_, index)| index)
    }

    fn cursor_is_loaded(&self) -> bool {
        self.loaded_index() == Some(self.playlist.cursor())
    }

    /// Stop the device without the user-facing "stopped" chatter.
    fn halt(&mut self) {
        self.device.stop();
        self.session = SessionState::Stopped;
        self.loaded = None;
        self.progress.cancel();
        self.emit(StatusEvent::Stopped);
    }

    fn halt_if_active(&mut self) {
        if self.session != SessionState::Stopped {
            self.halt();
        }
    }

    fn shutdown(&mut self) {
        self.progress.cancel();
        self.device.stop();
        self.session = SessionState::Stopped;
        self.loaded = None;
        info!("controller stopped");
    }

    fn announce(&self) {
        self.playlist_changed();
        self.emit(StatusEvent::ModeChanged { mode: self.mode });
        self.emit(StatusEvent::VolumeChanged {
            percent: self.volume,
        });
    }

    fn announce_now_playing(&self, index: usize) {
        if let Some(track) = self.playlist.get(index) {
            info!(index, track = track.as_str(), "now playing");
            self.emit(StatusEvent::NowPlaying {
                index,
                track: track.clone(),
            });
            self.message(format!("Now playing: {}", track.display_name()));
        }
    }

    fn playlist_changed(&self) {
        self.emit(StatusEvent::PlaylistChanged {
            tracks: self.playlist.tracks().to_vec(),
            cursor: self.playlist.cursor(),
            now_playing: self.loaded_index(),
        });
    }

    fn report_error(&self, err: &PlayerError) {
        let message = err.to_string();
        if err.is_serious() {
            error!(error = %message, "operation failed");
            self.error_log.append(&message);
        } else {
            warn!(error = %message, "operation rejected");
        }
        self.emit(StatusEvent::Error(message));
    }

    fn message(&self, text: impl Into<String>) {
        self.emit(StatusEvent::Message(text.into()));
    }

    fn emit(&self, event: StatusEvent) {
        // The shell may already be gone during shutdown.
        let _ = self.status_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::state::ShellState;
    use crate::modules::playback::mock_device::{DeviceCall, MockDevice};
    use crossbeam_channel::{Receiver, unbounded};
    use std::fs;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    struct Fixture {
        controller: Controller,
        device: MockDevice,
        events: Receiver<AppEvent>,
        status: Receiver<StatusEvent>,
        dir: TempDir,
    }

    impl Fixture {
        /// Controller over files that exist on disk, one per name.
        fn with_files(names: &[&str]) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let tracks: Vec<Track> = names
                .iter()
                .map(|name| {
                    let path = dir.path().join(name);
                    fs::write(&path, b"media").unwrap();
                    Track::from_path(&path)
                })
                .collect();
            Self::build(dir, Playlist::from_tracks(tracks))
        }

        fn build(dir: TempDir, playlist: Playlist) -> Self {
            let settings = Settings {
                error_log: Some(dir.path().join("error.log")),
                poll_interval_ms: 10,
                ..Settings::default()
            };
            let device = MockDevice::new();
            let (event_tx, events) = unbounded();
            let (status_tx, status) = unbounded();
            let controller = Controller::new(Box::new(device.clone()), &settings, event_tx, status_tx)
                .with_playlist(playlist)
                .with_seed(11);
            Self {
                controller,
                device,
                events,
                status,
                dir,
            }
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        fn drain(&self) -> Vec<StatusEvent> {
            self.status.try_iter().collect()
        }

        fn messages(&self) -> Vec<String> {
            self.drain()
                .into_iter()
                .filter_map(|event| match event {
                    StatusEvent::Message(text) | StatusEvent::Error(text) => Some(text),
                    _ => None,
                })
                .collect()
        }

        fn error_log(&self) -> String {
            fs::read_to_string(self.path("error.log")).unwrap_or_default()
        }

        /// Deliver whatever the device queued on the event channel.
        fn pump_device_events(&mut self) {
            while let Ok(event) = self.events.try_recv() {
                self.controller.handle_event(event);
            }
        }
    }

    // ── toggle ────────────────────────────────────────────────────────────────

    #[test]
    fn toggle_on_empty_playlist_never_touches_device() {
        let mut fx = Fixture::build(tempfile::tempdir().unwrap(), Playlist::new());
        fx.device.state().calls.clear();

        fx.controller.toggle();

        assert!(fx.device.calls().is_empty());
        assert_eq!(fx.messages(), vec!["No playlist loaded"]);
        assert_eq!(fx.controller.session(), SessionState::Stopped);
    }

    #[test]
    fn toggle_starts_cursor_track() {
        let mut fx = Fixture::with_files(&["a.mp3", "b.mp3"]);
        fx.controller.toggle();

        assert_eq!(fx.device.loads(), vec![fx.path("a.mp3")]);
        assert_eq!(fx.controller.session(), SessionState::Playing);
        assert!(fx.messages().contains(&"Now playing: a.mp3".to_string()));
    }

    #[test]
    fn toggle_pauses_then_resumes_without_reloading() {
        let mut fx = Fixture::with_files(&["a.mp3"]);
        fx.controller.toggle();
        fx.controller.toggle();
        assert_eq!(fx.controller.session(), SessionState::Paused);
        assert!(!fx.controller.progress.is_running());

        fx.controller.toggle();
        assert_eq!(fx.controller.session(), SessionState::Playing);
        assert_eq!(fx.device.loads().len(), 1);
        assert_eq!(fx.device.calls().last(), Some(&DeviceCall::Play));
    }

    #[test]
    fn toggle_after_paused_cursor_move_starts_new_track() {
        let mut fx = Fixture::with_files(&["a.mp3", "b.mp3"]);
        fx.controller.toggle();
        fx.controller.toggle();
        fx.controller.next();
        assert_eq!(fx.device.loads().len(), 1, "paused next only moves the cursor");

        fx.controller.toggle();
        assert_eq!(fx.device.loads(), vec![fx.path("a.mp3"), fx.path("b.mp3")]);
    }

    // ── failure handling ──────────────────────────────────────────────────────

    #[test]
    fn missing_file_reports_and_advances_once() {
        let mut fx = Fixture::with_files(&["b.mp3"]);
        let missing = fx.path("gone.mp3");
        let mut playlist = Playlist::from_tracks([Track::from_path(&missing)]);
        playlist.add(fx.controller.playlist().tracks().to_vec());
        fx.controller.playlist = playlist;

        fx.controller.toggle();

        let messages = fx.messages();
        assert_eq!(messages[0], format!("File not found: {}", missing.display()));
        assert_eq!(fx.device.loads(), vec![fx.path("b.mp3")]);
        assert_eq!(fx.controller.playlist().cursor(), 1);
        assert!(fx.error_log().contains("File not found"));
    }

    #[test]
    fn device_failure_advances_to_next_track() {
        let mut fx = Fixture::with_files(&["a.mkv", "b.mp3"]);
        fx.device.reject(&fx.path("a.mkv"));

        fx.controller.toggle();

        assert_eq!(fx.device.loads(), vec![fx.path("a.mkv"), fx.path("b.mp3")]);
        assert_eq!(fx.controller.session(), SessionState::Playing);
        assert!(fx.error_log().contains("Playback failed"));
    }

    #[test]
    fn fully_unplayable_playlist_gives_up_after_one_pass() {
        let mut fx = Fixture::with_files(&["a.mkv", "b.mkv", "c.mkv"]);
        for name in ["a.mkv", "b.mkv", "c.mkv"] {
            fx.device.reject(&fx.path(name));
        }
        fx.controller.select_mode(PlayMode::RepeatAll);
        fx.drain();

        fx.controller.toggle();

        assert_eq!(fx.device.loads().len(), 3);
        assert_eq!(fx.controller.session(), SessionState::Stopped);
        assert_eq!(
            fx.messages().last().map(String::as_str),
            Some("No playable tracks in playlist")
        );
    }

    #[test]
    fn shuffle_failures_are_bounded_too() {
        let mut fx = Fixture::with_files(&["a.mkv", "b.mkv"]);
        fx.device.reject(&fx.path("a.mkv"));
        fx.device.reject(&fx.path("b.mkv"));
        fx.controller.select_mode(PlayMode::Shuffle);

        fx.controller.toggle();

        let loads = fx.device.loads();
        assert_eq!(loads.len(), 2);
        assert_ne!(loads[0], loads[1], "each entry is tried once");
        assert_eq!(fx.controller.session(), SessionState::Stopped);
    }

    #[test]
    fn shuffle_fallback_reaches_playable_neighbour() {
        for seed in 0..20 {
            let mut fx = Fixture::with_files(&["bad.mkv", "good.mp3"]);
            fx.device.reject(&fx.path("bad.mkv"));
            fx.controller.select_mode(PlayMode::Shuffle);
            fx.controller.rng = StdRng::seed_from_u64(seed);

            fx.controller.toggle();

            let loads = fx.device.loads();
            assert_eq!(loads.last(), Some(&fx.path("good.mp3")), "seed {seed}");
            let bad_attempts = loads.iter().filter(|p| **p == fx.path("bad.mkv")).count();
            assert!(bad_attempts <= 1, "seed {seed}: bad.mkv tried {bad_attempts} times");
            assert_eq!(fx.controller.session(), SessionState::Playing);
            assert!(!fx.messages().contains(&"No playable tracks in playlist".to_string()));
        }
    }

    #[test]
    fn sequential_failure_on_last_track_stops() {
        let mut fx = Fixture::with_files(&["a.mp3", "b.mkv"]);
        fx.device.reject(&fx.path("b.mkv"));

        fx.controller.play_selected(1).unwrap();

        assert_eq!(fx.device.loads(), vec![fx.path("b.mkv")]);
        assert_eq!(fx.controller.session(), SessionState::Stopped);
        assert!(fx.messages().contains(&"Playback stopped".to_string()));
    }

    #[test]
    fn repeat_one_failure_does_not_retry_same_track() {
        let mut fx = Fixture::with_files(&["a.mkv", "b.mp3"]);
        fx.device.reject(&fx.path("a.mkv"));
        fx.controller.select_mode(PlayMode::RepeatOne);

        fx.controller.toggle();

        assert_eq!(fx.device.loads(), vec![fx.path("a.mkv")]);
        assert_eq!(fx.controller.session(), SessionState::Stopped);
    }

    // ── next / previous ───────────────────────────────────────────────────────

    #[test]
    fn sequential_next_at_end_stops() {
        let mut fx = Fixture::with_files(&["a.mp3", "b.mp3", "c.mp3"]);
        fx.controller.play_selected(2).unwrap();
        fx.controller.next();

        assert_eq!(fx.controller.session(), SessionState::Stopped);
        assert_eq!(fx.controller.playlist().cursor(), 2);
        assert_eq!(fx.device.calls().last(), Some(&DeviceCall::Stop));
    }

    #[test]
    fn repeat_all_next_at_end_wraps() {
        let mut fx = Fixture::with_files(&["a.mp3", "b.mp3", "c.mp3"]);
        fx.controller.select_mode(PlayMode::RepeatAll);
        fx.controller.play_selected(2).unwrap();
        fx.controller.next();

        assert_eq!(fx.controller.playlist().cursor(), 0);
        assert_eq!(fx.device.loads().last(), Some(&fx.path("a.mp3")));
    }

    #[test]
    fn previous_while_stopped_only_moves_cursor() {
        let mut fx = Fixture::with_files(&["a.mp3", "b.mp3", "c.mp3"]);
        fx.controller.previous();

        assert_eq!(fx.controller.playlist().cursor(), 2);
        assert!(fx.device.loads().is_empty());
        assert!(fx.drain().contains(&StatusEvent::CursorMoved { index: 2 }));
    }

    #[test]
    fn previous_while_playing_plays_previous() {
        let mut fx = Fixture::with_files(&["a.mp3", "b.mp3"]);
        fx.controller.play_selected(1).unwrap();
        fx.controller.previous();
        assert_eq!(fx.device.loads().last(), Some(&fx.path("a.mp3")));
    }

    #[test]
    fn next_on_empty_playlist_is_noop() {
        let mut fx = Fixture::build(tempfile::tempdir().unwrap(), Playlist::new());
        fx.device.state().calls.clear();
        fx.controller.next();
        fx.controller.previous();
        assert!(fx.device.calls().is_empty());
    }

    // ── end of media ──────────────────────────────────────────────────────────

    #[test]
    fn end_of_media_advances_like_next() {
        let mut fx = Fixture::with_files(&["a.mp3", "b.mp3"]);
        fx.controller.toggle();

        fx.device.finish_current();
        fx.pump_device_events();

        assert_eq!(fx.device.loads(), vec![fx.path("a.mp3"), fx.path("b.mp3")]);
        assert_eq!(fx.controller.playlist().cursor(), 1);
    }

    #[test]
    fn end_of_media_repeat_one_replays() {
        let mut fx = Fixture::with_files(&["a.mp3", "b.mp3"]);
        fx.controller.select_mode(PlayMode::RepeatOne);
        fx.controller.toggle();

        fx.device.finish_current();
        fx.pump_device_events();

        assert_eq!(fx.device.loads(), vec![fx.path("a.mp3"), fx.path("a.mp3")]);
    }

    #[test]
    fn stale_end_of_media_is_ignored() {
        let mut fx = Fixture::with_files(&["a.mp3", "b.mp3", "c.mp3"]);
        fx.controller.toggle();
        let stale = fx.device.finish_current().unwrap();
        fx.pump_device_events();
        assert_eq!(fx.controller.playlist().cursor(), 1);

        // A late duplicate for media that was already replaced.
        fx.controller
            .handle_event(AppEvent::Device(DeviceEvent::EndReached { handle: stale }));
        assert_eq!(fx.controller.playlist().cursor(), 1);
        assert_eq!(fx.device.loads().len(), 2);
    }

    #[test]
    fn end_of_media_after_stop_is_ignored() {
        let mut fx = Fixture::with_files(&["a.mp3", "b.mp3"]);
        fx.controller.toggle();
        let handle = fx.controller.loaded.map(|(h, _)| h).unwrap();
        fx.controller.stop();

        fx.controller
            .handle_event(AppEvent::Device(DeviceEvent::EndReached { handle }));
        assert_eq!(fx.device.loads().len(), 1);
    }

    // ── mode / seek / volume ──────────────────────────────────────────────────

    #[test]
    fn mode_switch_while_playing_restarts_current() {
        let mut fx = Fixture::with_files(&["a.mp3", "b.mp3"]);
        fx.controller.play_selected(1).unwrap();
        fx.controller.select_mode(PlayMode::Shuffle);

        assert_eq!(fx.device.loads(), vec![fx.path("b.mp3"), fx.path("b.mp3")]);
        assert_eq!(fx.controller.playlist().cursor(), 1);
        assert!(
            fx.messages()
                .contains(&"Play mode changed to Shuffle".to_string())
        );
    }

    #[test]
    fn mode_switch_while_stopped_does_not_play() {
        let mut fx = Fixture::with_files(&["a.mp3"]);
        fx.controller.select_mode(PlayMode::RepeatAll);
        assert!(fx.device.loads().is_empty());
        assert_eq!(fx.controller.mode(), PlayMode::RepeatAll);
    }

    #[test]
    fn seek_only_applies_while_playing() {
        let mut fx = Fixture::with_files(&["a.mp3"]);
        fx.controller.seek(0.5);
        assert!(!fx.device.calls().contains(&DeviceCall::SetPosition(0.5)));

        fx.controller.toggle();
        fx.controller.seek(0.5);
        fx.controller.seek(3.0);
        let calls = fx.device.calls();
        assert!(calls.contains(&DeviceCall::SetPosition(0.5)));
        assert!(calls.contains(&DeviceCall::SetPosition(1.0)));

        fx.controller.toggle();
        fx.device.state().calls.clear();
        fx.controller.seek(0.2);
        assert!(fx.device.calls().is_empty(), "paused seek is a no-op");
    }

    #[test]
    fn volume_reports_muted_and_level() {
        let mut fx = Fixture::with_files(&[]);
        fx.controller.set_volume(0);
        fx.controller.set_volume(150);

        assert_eq!(fx.messages(), vec!["Muted", "Volume: 100%"]);
        assert_eq!(fx.controller.volume(), 100);
        let calls = fx.device.calls();
        assert!(calls.ends_with(&[DeviceCall::SetVolume(0), DeviceCall::SetVolume(100)]));
    }

    // ── playlist commands ─────────────────────────────────────────────────────

    #[test]
    fn add_skips_duplicates_and_reports_count() {
        let mut fx = Fixture::with_files(&["a.mp3"]);
        let existing = fx.path("a.mp3");
        let added = fx
            .controller
            .add_media(vec![existing, PathBuf::from("/new/b.mp3")]);

        assert_eq!(added, 1);
        assert_eq!(fx.controller.playlist().len(), 2);
        assert!(fx.messages().contains(&"Added 1 items to playlist".to_string()));
    }

    #[test]
    fn add_nothing_reports_no_selection() {
        let mut fx = Fixture::with_files(&["a.mp3"]);
        assert_eq!(fx.controller.add_media(Vec::new()), 0);
        assert_eq!(fx.messages(), vec!["No files selected"]);
    }

    #[test]
    fn removing_playing_track_stops_playback() {
        let mut fx = Fixture::with_files(&["a.mp3", "b.mp3"]);
        fx.controller.toggle();
        fx.controller.remove_selected(0).unwrap();

        assert_eq!(fx.controller.session(), SessionState::Stopped);
        assert_eq!(fx.controller.playlist().len(), 1);
    }

    #[test]
    fn removing_other_track_keeps_playing() {
        let mut fx = Fixture::with_files(&["a.mp3", "b.mp3"]);
        fx.controller.play_selected(1).unwrap();
        fx.controller.remove_selected(0).unwrap();

        assert_eq!(fx.controller.session(), SessionState::Playing);
        assert_eq!(fx.controller.playlist().cursor(), 0);
        assert_eq!(
            fx.controller.playlist().current(),
            Some(&Track::from_path(&fx.path("b.mp3")))
        );
        assert_eq!(fx.controller.loaded_index(), Some(0));

        fx.controller.toggle();
        assert_eq!(fx.controller.session(), SessionState::Paused);
    }

    #[test]
    fn paused_remove_after_cursor_move_keeps_marker_on_loaded_track() {
        let mut fx = Fixture::with_files(&["a.mp3", "b.mp3", "c.mp3"]);
        fx.controller.toggle();
        fx.controller.toggle();
        fx.controller.next();
        fx.controller.remove_selected(1).unwrap();

        let mut state = ShellState::default();
        for event in fx.drain() {
            state.apply(&event);
        }
        assert_eq!(state.playback.now_playing, Some(0));
        assert_eq!(state.playlist.cursor, 1);
        assert_eq!(fx.controller.session(), SessionState::Paused);
    }

    #[test]
    fn removing_duplicate_entry_keeps_playing() {
        let mut fx = Fixture::with_files(&["a.mp3"]);
        let path = fx.path("a.mp3").display().to_string();
        let mut playlist = Playlist::new();
        playlist
            .load_from(&serde_json::to_string(&[&path, &path]).unwrap())
            .unwrap();
        fx.controller.playlist = playlist;

        fx.controller.play_selected(0).unwrap();
        fx.controller.remove_selected(1).unwrap();

        assert_eq!(fx.controller.session(), SessionState::Playing);
        assert_eq!(fx.controller.playlist().len(), 1);
        assert_eq!(fx.controller.loaded_index(), Some(0));
    }

    #[test]
    fn remove_out_of_range_is_reported_not_logged() {
        let mut fx = Fixture::with_files(&["a.mp3"]);
        fx.controller.dispatch(Command::RemoveSelected { index: 9 });

        let messages = fx.messages();
        assert!(messages[0].contains("out of range"));
        assert_eq!(fx.error_log(), "");
    }

    #[test]
    fn clear_while_playing_stops() {
        let mut fx = Fixture::with_files(&["a.mp3", "b.mp3"]);
        fx.controller.toggle();
        fx.controller.clear_all();

        assert!(fx.controller.playlist().is_empty());
        assert_eq!(fx.controller.session(), SessionState::Stopped);

        fx.drain();
        fx.controller.clear_all();
        assert_eq!(fx.messages(), vec!["Playlist is already empty"]);
    }

    #[test]
    fn save_empty_playlist_is_a_status() {
        let mut fx = Fixture::build(tempfile::tempdir().unwrap(), Playlist::new());
        let target = fx.path("list.json");
        fx.controller.dispatch(Command::Save {
            path: target.clone(),
        });

        assert_eq!(fx.messages(), vec!["Playlist is empty"]);
        assert!(!target.exists());
    }

    #[test]
    fn save_then_load_restores_playlist() {
        let mut fx = Fixture::with_files(&["a.mp3", "b.mp3"]);
        let target = fx.path("list.json");
        let saved = fx.controller.playlist().clone();

        fx.controller.save(&target).unwrap();
        fx.controller.clear_all();
        fx.controller.load(&target).unwrap();

        assert_eq!(fx.controller.playlist().tracks(), saved.tracks());
    }

    #[test]
    fn malformed_load_keeps_playlist_and_logs() {
        let mut fx = Fixture::with_files(&["a.mp3"]);
        let bad = fx.path("bad.json");
        fs::write(&bad, r#"{"not": "a list"}"#).unwrap();

        fx.controller.dispatch(Command::Load { path: bad });

        assert_eq!(fx.controller.playlist().len(), 1);
        assert!(fx.messages()[0].starts_with("Malformed playlist"));
        assert!(fx.error_log().contains("Malformed playlist"));
    }

    #[test]
    fn scan_directory_reports_missing_and_empty() {
        let mut fx = Fixture::with_files(&[]);
        let missing = fx.path("nowhere");
        fx.controller.scan_directory(&missing);

        let empty = fx.path("empty");
        fs::create_dir(&empty).unwrap();
        fx.controller.scan_directory(&empty);

        let messages = fx.messages();
        assert!(messages[0].contains("does not exist"));
        assert!(messages[1].starts_with("No media files found"));
        assert!(fx.controller.playlist().is_empty());
    }

    #[test]
    fn scan_directory_seeds_playlist() {
        let mut fx = Fixture::with_files(&["a.mp3", "b.avi"]);
        fx.controller.clear_all();
        let dir = fx.dir.path().to_path_buf();
        fx.controller.scan_directory(&dir);
        assert_eq!(fx.controller.playlist().len(), 2);
    }

    // ── progress ──────────────────────────────────────────────────────────────

    #[test]
    fn progress_reported_only_while_playing() {
        let mut fx = Fixture::with_files(&["a.mp3"]);
        fx.device.state().length = Some(Duration::from_secs(100));
        fx.controller.toggle();
        fx.device.state().position = 0.25;
        fx.drain();

        fx.controller.report_progress();
        let expected = PlaybackProgress::new(0.25, Some(Duration::from_secs(100)));
        assert_eq!(fx.drain(), vec![StatusEvent::Progress(expected)]);

        fx.controller.stop();
        assert!(!fx.controller.progress.is_running());
        fx.drain();
        fx.controller.report_progress();
        assert!(fx.drain().is_empty());
    }

    // ── event loop ────────────────────────────────────────────────────────────

    #[test]
    fn run_serializes_commands_and_device_events() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = ["a.mp3", "b.mp3"]
            .iter()
            .map(|name| dir.path().join(name))
            .collect();
        for path in &paths {
            fs::write(path, b"media").unwrap();
        }
        let playlist = Playlist::from_tracks(paths.iter().map(|p| Track::from_path(p)));
        let settings = Settings {
            error_log: Some(dir.path().join("error.log")),
            poll_interval_ms: 10,
            ..Settings::default()
        };

        let device = MockDevice::new();
        let (tx, rx) = unbounded();
        let (status_tx, status) = unbounded();

        // The device is not Send, so the controller is built on its own thread.
        let worker_device = device.clone();
        let event_tx = tx.clone();
        let worker = thread::spawn(move || {
            Controller::new(Box::new(worker_device), &settings, event_tx, status_tx)
                .with_playlist(playlist)
                .run(rx)
        });

        let now_playing = |status: &Receiver<StatusEvent>| {
            status
                .iter()
                .find_map(|event| match event {
                    StatusEvent::NowPlaying { index, .. } => Some(index),
                    _ => None,
                })
                .unwrap()
        };

        tx.send(AppEvent::Command(Command::Toggle)).unwrap();
        assert_eq!(now_playing(&status), 0);

        device.finish_current();
        assert_eq!(now_playing(&status), 1);

        let ticked = status
            .iter()
            .find(|event| matches!(event, StatusEvent::Progress(_)));
        assert!(ticked.is_some(), "progress ticks while playing");

        tx.send(AppEvent::Shutdown).unwrap();
        worker.join().unwrap();
        assert_eq!(device.calls().last(), Some(&DeviceCall::Stop));
        assert_eq!(device.loads(), paths);
    }
}
