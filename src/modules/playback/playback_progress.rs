use std::time::Duration;

/// Position of the current media as reported by the device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackProgress {
    fraction: f64,
    length: Option<Duration>,
}

impl PlaybackProgress {
    /// Creates a new PlaybackProgress instance
    ///
    /// # Arguments
    /// * `fraction` - Device position, clamped to 0.0 - 1.0 (NaN counts as 0.0)
    /// * `length` - Total media length, if known
    pub fn new(fraction: f64, length: Option<Duration>) -> Self {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        Self { fraction, length }
    }

    /// Returns the ratio of progress (0.0 to 1.0)
    pub fn ratio(&self) -> f64 {
        self.fraction
    }

    /// Returns the elapsed duration, when the length is known
    pub fn elapsed(&self) -> Option<Duration> {
        self.length.map(|total| total.mul_f64(self.fraction))
    }

    /// Returns the total duration, when known
    pub fn total(&self) -> Option<Duration> {
        self.length
    }

    pub fn percentage(&self) -> u8 {
        (self.fraction * 100.0).round() as u8
    }
}
