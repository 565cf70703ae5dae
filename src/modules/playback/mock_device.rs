//! Recording playback device for controller tests.

use crate::core::events::{AppEvent, DeviceEvent, EventSender};
use crate::core::models::MediaHandle;
use crate::core::traits::PlaybackDevice;
use anyhow::{Result, bail};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    Load(PathBuf),
    Play,
    Pause,
    Stop,
    SetPosition(f64),
    SetVolume(u8),
}

#[derive(Debug, Default)]
pub struct MockState {
    pub calls: Vec<DeviceCall>,
    pub playing: bool,
    pub loaded: Option<MediaHandle>,
    pub position: f64,
    pub length: Option<Duration>,
    pub undecodable: HashSet<PathBuf>,
    pub notifier: Option<EventSender>,
    last_handle: u64,
}

/// Cheap-to-clone handle; clones share the recorded state.
#[derive(Debug, Clone, Default)]
pub struct MockDevice {
    state: Arc<Mutex<MockState>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.state().calls.clone()
    }

    pub fn loads(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DeviceCall::Load(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    /// Make `load_media` fail for this path as if the decoder rejected it.
    pub fn reject(&self, path: &Path) {
        self.state().undecodable.insert(path.to_path_buf());
    }

    /// Simulate the loaded media ending, as the device thread would.
    pub fn finish_current(&self) -> Option<MediaHandle> {
        let mut state = self.state();
        let handle = state.loaded?;
        state.playing = false;
        if let Some(tx) = &state.notifier {
            let _ = tx.send(AppEvent::Device(DeviceEvent::EndReached { handle }));
        }
        Some(handle)
    }
}

impl PlaybackDevice for MockDevice {
    fn load_media(&mut self, path: &Path) -> Result<MediaHandle> {
        let mut state = self.state();
        state.calls.push(DeviceCall::Load(path.to_path_buf()));
        state.playing = false;
        state.loaded = None;
        if state.undecodable.contains(path) {
            bail!("unsupported format");
        }
        state.last_handle += 1;
        let handle = MediaHandle(state.last_handle);
        state.loaded = Some(handle);
        state.position = 0.0;
        Ok(handle)
    }

    fn play(&mut self) -> Result<()> {
        let mut state = self.state();
        state.calls.push(DeviceCall::Play);
        if state.loaded.is_none() {
            bail!("No media loaded");
        }
        state.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        let mut state = self.state();
        state.calls.push(DeviceCall::Pause);
        state.playing = false;
    }

    fn stop(&mut self) {
        let mut state = self.state();
        state.calls.push(DeviceCall::Stop);
        state.playing = false;
        state.loaded = None;
    }

    fn is_playing(&self) -> bool {
        self.state().playing
    }

    fn position(&self) -> f64 {
        self.state().position
    }

    fn length(&self) -> Option<Duration> {
        self.state().length
    }

    fn set_position(&mut self, fraction: f64) -> Result<()> {
        let mut state = self.state();
        state.calls.push(DeviceCall::SetPosition(fraction));
        state.position = fraction;
        Ok(())
    }

    fn set_volume(&mut self, percent: u8) {
        self.state().calls.push(DeviceCall::SetVolume(percent));
    }

    fn on_end_reached(&mut self, notifier: EventSender) {
        self.state().notifier = Some(notifier);
    }
}
