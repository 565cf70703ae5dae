use crate::application::state::ShellState;
use crate::core::events::Command;
use crate::core::models::Track;
use crate::core::traits::{ShellInput, UiRenderer};
use crate::modules::ui::progress_formatter::{progress_bar, progress_label};
use crate::utils::APP_NAME;
use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    style::Print,
    terminal::{self, ClearType},
};
use std::io::{Write, stdout};
use std::path::PathBuf;
use std::time::Duration;

const VOLUME_STEP: u8 = 5;
const PROGRESS_WIDTH: usize = 30;
const CLEAR_PROMPT: &str = "Clear playlist? (y/n)";
const NO_SELECTION: &str = "No track selected";
const HELP: &str = "Space play/pause | \u{2190}/\u{2192} prev/next | Enter play | Esc stop | m mode | +/- volume | 0-9 seek | Del remove | c clear | s save | q quit";

pub struct TerminalRenderer {
    initialized: bool,
    /// Where `s` saves the playlist
    save_path: Option<PathBuf>,
    /// Set by `c`; the next key answers the prompt
    confirm_clear: bool,
    last_frame: Vec<String>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            initialized: false,
            save_path: None,
            confirm_clear: false,
            last_frame: Vec::new(),
        }
    }

    pub fn with_save_path(mut self, path: PathBuf) -> Self {
        self.save_path = Some(path);
        self
    }

    pub fn print_message(&self, message: &str) {
        println!("{}", message);
    }

    pub fn print_error(&self, message: &str) {
        eprintln!("Error: {}", message);
    }

    /// One line per track, prefixed with the index `remove` expects.
    pub fn print_track_list(&self, tracks: &[Track]) {
        for (index, track) in tracks.iter().enumerate() {
            println!("{:>4}  {}", index, track.as_str());
        }
    }

    /// Translate one key press into shell input.
    pub fn map_key(&mut self, key: KeyEvent, state: &ShellState) -> Option<ShellInput> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        // Raw mode swallows SIGINT.
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(ShellInput::Quit);
        }

        // Any answer other than yes cancels and is not handled as a command.
        if self.confirm_clear {
            self.confirm_clear = false;
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    Some(ShellInput::Command(Command::ClearAll))
                }
                _ => None,
            };
        }

        let cursor = state.playlist.cursor;
        let volume = state.playback.volume;

        let command = match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => return Some(ShellInput::Quit),
            KeyCode::Char(' ') => Command::Toggle,
            KeyCode::Right => Command::Next,
            KeyCode::Left => Command::Previous,
            KeyCode::Esc => Command::Stop,
            KeyCode::Enter | KeyCode::Delete if state.is_empty() => {
                return Some(ShellInput::Notice(NO_SELECTION.to_string()));
            }
            KeyCode::Enter => Command::PlaySelected { index: cursor },
            KeyCode::Delete => Command::RemoveSelected { index: cursor },
            KeyCode::Char('m') | KeyCode::Char('M') => Command::SelectMode {
                mode: state.playback.mode.cycle(),
            },
            KeyCode::Char('+') | KeyCode::Char('=') => Command::SetVolume {
                percent: volume.saturating_add(VOLUME_STEP).min(100),
            },
            KeyCode::Char('-') => Command::SetVolume {
                percent: volume.saturating_sub(VOLUME_STEP),
            },
            KeyCode::Char(digit @ '0'..='9') => Command::Seek {
                fraction: f64::from(digit as u8 - b'0') / 10.0,
            },
            KeyCode::Char('c') | KeyCode::Char('C') if !state.is_empty() => {
                self.confirm_clear = true;
                return None;
            }
            KeyCode::Char('c') | KeyCode::Char('C') => Command::ClearAll,
            KeyCode::Char('s') | KeyCode::Char('S') => Command::Save {
                path: self.save_path.clone()?,
            },
            _ => return None,
        };

        Some(ShellInput::Command(command))
    }

    fn prompt(&self) -> Option<&'static str> {
        self.confirm_clear.then_some(CLEAR_PROMPT)
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Lay out one full screen of text for `state`. A pending `prompt` takes the status line.
pub fn compose_frame(
    state: &ShellState,
    prompt: Option<&str>,
    width: usize,
    height: usize,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(height);

    let volume = match state.playback.volume {
        0 => "Muted".to_string(),
        v => format!("{}%", v),
    };
    lines.push(format!(
        "{} | {} | Mode: {} | Volume: {}",
        APP_NAME,
        state.transport_label(),
        state.playback.mode,
        volume
    ));
    lines.push(match &state.playback.progress {
        Some(progress) => format!(
            "{} {}",
            progress_bar(progress, PROGRESS_WIDTH),
            progress_label(progress)
        ),
        None => String::new(),
    });
    lines.push("\u{2500}".repeat(width));

    // Header, progress, rule, status, help
    let rows = height.saturating_sub(5).max(1);
    let tracks = &state.playlist.tracks;
    if tracks.is_empty() {
        lines.push("  (playlist is empty)".to_string());
    } else {
        let start = state
            .playlist
            .cursor
            .saturating_sub(rows / 2)
            .min(tracks.len().saturating_sub(rows));
        for (index, track) in tracks.iter().enumerate().skip(start).take(rows) {
            let selected = if index == state.playlist.cursor { '>' } else { ' ' };
            let playing = if state.playback.now_playing == Some(index) { '*' } else { ' ' };
            lines.push(format!("{}{} {:>3}. {}", selected, playing, index + 1, track.display_name()));
        }
    }

    while lines.len() < height.saturating_sub(2) {
        lines.push(String::new());
    }
    lines.push(match (prompt, &state.ui.error_message) {
        (Some(prompt), _) => prompt.to_string(),
        (None, Some(error)) => format!("Error: {}", error),
        (None, None) => state.ui.status_message.clone(),
    });
    lines.push(HELP.to_string());

    lines
        .into_iter()
        .map(|line| line.chars().take(width).collect())
        .collect()
}

impl UiRenderer for TerminalRenderer {
    fn init(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        queue!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;
        stdout().flush()?;
        self.initialized = true;
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.initialized {
            queue!(stdout(), cursor::Show, terminal::LeaveAlternateScreen)?;
            stdout().flush()?;
            terminal::disable_raw_mode()?;
            self.initialized = false;
        }
        Ok(())
    }

    fn render(&mut self, state: &ShellState) -> Result<()> {
        let (width, height) = terminal::size()?;
        let frame = compose_frame(state, self.prompt(), width as usize, height as usize);
        if frame == self.last_frame {
            return Ok(());
        }

        let mut stdout = stdout();
        queue!(stdout, terminal::Clear(ClearType::All))?;
        for (row, line) in frame.iter().enumerate() {
            queue!(stdout, cursor::MoveTo(0, row as u16), Print(line))?;
        }
        stdout.flush()?;

        self.last_frame = frame;
        Ok(())
    }

    fn poll_input(&mut self, state: &ShellState) -> Result<Vec<ShellInput>> {
        let mut inputs = Vec::new();

        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key) => inputs.extend(self.map_key(key, state)),
                Event::Resize(..) => self.last_frame.clear(),
                _ => {}
            }
        }

        Ok(inputs)
    }
}
