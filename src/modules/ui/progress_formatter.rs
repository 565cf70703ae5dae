use crate::modules::playback::playback_progress::PlaybackProgress;
use std::time::Duration;

/// Formats a duration as MM:SS or HH:MM:SS
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Label for the status line: "00:34 / 03:10", or a percentage when the
/// media length is unknown.
pub fn progress_label(progress: &PlaybackProgress) -> String {
    match (progress.elapsed(), progress.total()) {
        (Some(elapsed), Some(total)) => {
            format!("{} / {}", format_duration(elapsed), format_duration(total))
        }
        _ => format!("{}%", progress.percentage()),
    }
}

/// Text progress bar of `width` cells, e.g. `[=====>    ]`.
pub fn progress_bar(progress: &PlaybackProgress, width: usize) -> String {
    let filled = ((progress.ratio() * width as f64).round() as usize).min(width);
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    for cell in 0..width {
        bar.push(match cell {
            c if c + 1 < filled => '=',
            c if c + 1 == filled => '>',
            _ => ' ',
        });
    }
    bar.push(']');
    bar
}
