use crate::core::events::{AppEvent, DeviceEvent, EventSender};
use crate::core::models::MediaHandle;
use crate::core::traits::PlaybackDevice;
use crate::utils::volume_percent_to_amplitude;
use anyhow::{Context, Result, anyhow, bail};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// How often the watcher thread checks whether the sink drained.
const WATCH_INTERVAL: Duration = Duration::from_millis(100);

/// `armed` value meaning no end-of-media notification is pending.
const DISARMED: u64 = 0;

/// State shared with the end-of-media watcher thread.
struct Shared {
    sink: Sink,
    /// Handle of the loaded media until its end has been reported
    armed: AtomicU64,
    notifier: Mutex<Option<EventSender>>,
    shutdown: AtomicBool,
}

/// Playback device backed by a rodio sink on the default output.
pub struct RodioDevice {
    // Dropping the stream silences the sink.
    _stream: OutputStream,
    shared: Arc<Shared>,
    last_handle: u64,
    current: Option<MediaHandle>,
    length: Option<Duration>,
    watcher: Option<JoinHandle<()>>,
}

impl RodioDevice {
    pub fn new() -> Result<Self> {
        let mut stream =
            OutputStreamBuilder::open_default_stream().context("Failed to open audio output")?;
        stream.log_on_drop(false);

        let sink = Sink::connect_new(stream.mixer());

        let shared = Arc::new(Shared {
            sink,
            armed: AtomicU64::new(DISARMED),
            notifier: Mutex::new(None),
            shutdown: AtomicBool::new(false),
        });

        let watcher_state = Arc::clone(&shared);
        let watcher = thread::Builder::new()
            .name("playdeck-end-watch".to_string())
            .spawn(move || watch_for_end(watcher_state))
            .context("Failed to start end-of-media watcher")?;

        Ok(Self {
            _stream: stream,
            shared,
            last_handle: DISARMED,
            current: None,
            length: None,
            watcher: Some(watcher),
        })
    }

    fn disarm(&self) {
        self.shared.armed.store(DISARMED, Ordering::Release);
    }
}

impl PlaybackDevice for RodioDevice {
    fn load_media(&mut self, path: &Path) -> Result<MediaHandle> {
        self.disarm();
        self.shared.sink.stop();
        self.current = None;
        self.length = None;

        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let source = Decoder::new(BufReader::new(file))
            .with_context(|| format!("Failed to decode media file: {}", path.display()))?;

        self.length = source.total_duration();

        // Loaded media waits for play().
        self.shared.sink.pause();
        self.shared.sink.append(source);

        self.last_handle += 1;
        let handle = MediaHandle(self.last_handle);
        self.current = Some(handle);
        self.shared.armed.store(handle.0, Ordering::Release);

        debug!(path = %path.display(), length = ?self.length, "media loaded");
        Ok(handle)
    }

    fn play(&mut self) -> Result<()> {
        if self.current.is_none() {
            bail!("No media loaded");
        }
        self.shared.sink.play();
        Ok(())
    }

    fn pause(&mut self) {
        if self.current.is_some() {
            self.shared.sink.pause();
        }
    }

    fn stop(&mut self) {
        self.disarm();
        self.shared.sink.stop();
        self.current = None;
        self.length = None;
    }

    fn is_playing(&self) -> bool {
        self.current.is_some() && !self.shared.sink.is_paused() && !self.shared.sink.empty()
    }

    fn position(&self) -> f64 {
        match self.length {
            Some(total) if !total.is_zero() && self.current.is_some() => {
                (self.shared.sink.get_pos().as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    fn length(&self) -> Option<Duration> {
        self.length
    }

    fn set_position(&mut self, fraction: f64) -> Result<()> {
        let total = self.length.context("Media length unknown; cannot seek")?;
        let target = total.mul_f64(fraction.clamp(0.0, 1.0));
        self.shared
            .sink
            .try_seek(target)
            .map_err(|e| anyhow!("Seek failed: {e}"))
    }

    fn set_volume(&mut self, percent: u8) {
        self.shared.sink.set_volume(volume_percent_to_amplitude(percent));
    }

    fn on_end_reached(&mut self, notifier: EventSender) {
        match self.shared.notifier.lock() {
            Ok(mut slot) => *slot = Some(notifier),
            Err(_) => warn!("end-of-media notifier lock poisoned"),
        }
    }
}

/// Reports each armed media exactly once after the sink drains.
fn watch_for_end(shared: Arc<Shared>) {
    while !shared.shutdown.load(Ordering::Acquire) {
        thread::sleep(WATCH_INTERVAL);

        let armed = shared.armed.load(Ordering::Acquire);
        if armed == DISARMED || !shared.sink.empty() {
            continue;
        }
        if shared
            .armed
            .compare_exchange(armed, DISARMED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            continue;
        }

        let notifier = shared.notifier.lock().ok().and_then(|slot| slot.clone());
        if let Some(tx) = notifier {
            let handle = MediaHandle(armed);
            debug!(?handle, "end of media reached");
            if tx
                .send(AppEvent::Device(DeviceEvent::EndReached { handle }))
                .is_err()
            {
                break;
            }
        }
    }
}

// To avoid leaks
impl Drop for RodioDevice {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        self.disarm();
        self.shared.sink.stop();
        if let Some(watcher) = self.watcher.take() {
            let _ = watcher.join();
        }
    }
}
