use crate::application::controller::Controller;
use crate::application::state::ShellState;
use crate::core::events::*;
use crate::core::traits::*;
use crate::modules::library::playlist::Playlist;
use crate::modules::storage::settings::Settings;
use anyhow::{Context, Result, anyhow};
use crossbeam_channel::{bounded, unbounded};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Builds the playback device on the controller thread.
///
/// Audio output streams are usually tied to the thread that opened them, so
/// the device is never moved across threads.
pub type DeviceFactory = Box<dyn FnOnce() -> Result<Box<dyn PlaybackDevice>> + Send>;

/// Owning handle to a running controller thread.
pub struct PlayerHandle {
    event_tx: EventSender,
    status_rx: StatusReceiver,
    worker: Option<JoinHandle<()>>,
}

impl PlayerHandle {
    /// Start the controller on its own thread and wait until the device is up.
    pub fn spawn(factory: DeviceFactory, settings: Settings, playlist: Playlist) -> Result<Self> {
        let (event_tx, event_rx) = unbounded();
        let (status_tx, status_rx) = unbounded();
        let (ready_tx, ready_rx) = bounded::<Result<()>>(1);

        let device_events = event_tx.clone();
        let worker = thread::Builder::new()
            .name("playdeck-controller".into())
            .spawn(move || {
                let device = match factory() {
                    Ok(device) => device,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));

                Controller::new(device, &settings, device_events, status_tx)
                    .with_playlist(playlist)
                    .run(event_rx);
            })
            .context("Failed to spawn controller thread")?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = worker.join();
                return Err(e.context("Could not open playback device"));
            }
            Err(_) => {
                let _ = worker.join();
                return Err(anyhow!("Controller thread exited during startup"));
            }
        }

        Ok(Self {
            event_tx,
            status_rx,
            worker: Some(worker),
        })
    }

    pub fn send(&self, command: Command) -> Result<()> {
        self.event_tx
            .send(AppEvent::Command(command))
            .map_err(|_| anyhow!("Controller is no longer running"))
    }

    pub fn status(&self) -> &StatusReceiver {
        &self.status_rx
    }

    /// Stop the controller and wait for it. Safe to call more than once.
    pub fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        let _ = self.event_tx.send(AppEvent::Shutdown);
        if worker.join().is_err() {
            warn!("controller thread panicked");
        }
    }
}

impl Drop for PlayerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Interactive shell: forwards input to the controller and renders its status.
pub struct Application {
    player: PlayerHandle,
    state: ShellState,
    settings: Settings,

    // Module references
    storage_backend: Option<Box<dyn SettingsStore>>,
    ui_renderer: Option<Box<dyn UiRenderer>>,
}

impl Application {
    pub fn new(player: PlayerHandle, settings: Settings) -> Self {
        Self {
            player,
            state: ShellState::default(),
            settings,
            storage_backend: None,
            ui_renderer: None,
        }
    }

    /// Set the storage backend used to remember mode and volume
    pub fn with_storage_backend(mut self, backend: Box<dyn SettingsStore>) -> Self {
        self.storage_backend = Some(backend);
        self
    }

    /// Set the UI renderer
    pub fn with_ui_renderer(mut self, renderer: Box<dyn UiRenderer>) -> Self {
        self.ui_renderer = Some(renderer);
        self
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn send(&self, command: Command) -> Result<()> {
        self.player.send(command)
    }

    /// Apply every status event waiting on the channel
    pub fn process_status(&mut self) -> usize {
        let mut applied = 0;
        for event in self.player.status().try_iter() {
            self.state.apply(&event);
            applied += 1;
        }
        applied
    }

    /// Run the shell until the user quits.
    ///
    /// The terminal is restored and settings persisted even when the loop fails.
    pub fn run(&mut self) -> Result<()> {
        if let Some(ui) = &mut self.ui_renderer {
            ui.init()?;
        }

        let result = self.event_loop();

        if let Some(ui) = &mut self.ui_renderer {
            if let Err(e) = ui.cleanup() {
                warn!(error = %e, "failed to restore terminal");
            }
        }

        self.player.shutdown();
        self.process_status();
        self.persist_settings();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        loop {
            self.process_status();

            if let Some(ui) = &mut self.ui_renderer {
                ui.render(&self.state)?;

                for input in ui.poll_input(&self.state)? {
                    match input {
                        ShellInput::Command(command) => self.player.send(command)?,
                        ShellInput::Notice(text) => self.state.apply(&StatusEvent::Message(text)),
                        ShellInput::Quit => {
                            info!("quit requested");
                            return Ok(());
                        }
                    }
                }
            } else {
                return Ok(());
            }

            // Small sleep to prevent CPU spinning
            thread::sleep(Duration::from_millis(16)); // ~60 FPS
        }
    }

    /// Remember the mode and volume the session ended with.
    fn persist_settings(&mut self) {
        let Some(storage) = &self.storage_backend else {
            return;
        };

        self.settings.mode = self.state.playback.mode;
        self.settings.volume = self.state.playback.volume;
        match storage.save(&self.settings) {
            Ok(()) => debug!(mode = %self.settings.mode, volume = self.settings.volume, "settings saved"),
            Err(e) => warn!(error = %e, "could not save settings"),
        }
    }
}
