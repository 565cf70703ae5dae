use crossbeam_channel::{Receiver, never, tick};
use std::time::{Duration, Instant};

/// Periodic position-poll signal bound to the Playing state.
///
/// While running, [`ticks`](Self::ticks) yields an `Instant` every
/// `interval`; once cancelled it is a channel that never delivers. Dropping
/// the timer drops the tick source, so nothing fires after teardown.
#[derive(Debug)]
pub struct ProgressTimer {
    interval: Duration,
    ticks: Receiver<Instant>,
    running: bool,
}

impl ProgressTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ticks: never(),
            running: false,
        }
    }

    /// Start (or restart) ticking; the first tick arrives one interval from now.
    pub fn start(&mut self) {
        self.ticks = tick(self.interval);
        self.running = true;
    }

    pub fn cancel(&mut self) {
        if self.running {
            self.ticks = never();
            self.running = false;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn ticks(&self) -> &Receiver<Instant> {
        &self.ticks
    }
}
