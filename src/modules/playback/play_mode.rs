use crate::core::models::PlayMode;
use rand::Rng;
use rand::seq::IteratorRandom;

/// Result of asking where playback goes after the current track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Continue at this index.
    To(usize),
    /// Sequential mode ran past the last track; the caller stops playback.
    EndOfPlaylist,
}

/// Compute the index that follows `current` in a playlist of `n` tracks.
///
/// - `Shuffle`: uniform pick over the whole playlist, which may be `current` again
/// - `RepeatOne`: `current`
/// - `RepeatAll`: `current + 1`, wrapping to 0
/// - `Sequential`: `current + 1`, or [`Advance::EndOfPlaylist`] at the last index
///
/// Callers short-circuit on an empty playlist; `n == 0` yields
/// [`Advance::EndOfPlaylist`].
pub fn compute_next<R: Rng + ?Sized>(mode: PlayMode, current: usize, n: usize, rng: &mut R) -> Advance {
    debug_assert!(n == 0 || current < n, "cursor {current} outside playlist of {n}");
    if n == 0 {
        return Advance::EndOfPlaylist;
    }

    match mode {
        PlayMode::Shuffle => (0..n).choose(rng).map_or(Advance::EndOfPlaylist, Advance::To),
        PlayMode::RepeatOne => Advance::To(current),
        PlayMode::RepeatAll => Advance::To((current + 1) % n),
        PlayMode::Sequential => {
            if current + 1 < n {
                Advance::To(current + 1)
            } else {
                Advance::EndOfPlaylist
            }
        }
    }
}

/// Index before `current`, wrapping from 0 to the last track. Mode-independent.
pub fn compute_previous(current: usize, n: usize) -> usize {
    debug_assert!(n > 0, "previous on an empty playlist");
    if n == 0 {
        return 0;
    }
    (current % n + n - 1) % n
}
