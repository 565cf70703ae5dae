use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Append-only log of serious user-facing failures.
///
/// Each line is `<local timestamp>: <message>`. Failing to write is traced
/// and otherwise ignored.
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    path: Option<PathBuf>,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A log that records nothing.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn append(&self, message: &str) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = Self::write_line(path, message) {
            warn!(path = %path.display(), error = %e, "could not write error log");
        }
    }

    fn write_line(path: &Path, message: &str) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(
            file,
            "{}: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_timestamped_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("logs").join("error.log"));
        log.append("first");
        log.append("second");

        let content = fs::read_to_string(log.path().unwrap()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(": first"));
        assert!(lines[1].ends_with(": second"));
        assert!(lines[0].starts_with(char::is_numeric));
    }

    #[test]
    fn write_failure_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the open fail.
        let log = ErrorLog::new(dir.path());
        log.append("ignored");
    }

    #[test]
    fn disabled_log_is_silent() {
        let log = ErrorLog::disabled();
        assert!(log.path().is_none());
        log.append("nothing");
    }
}
