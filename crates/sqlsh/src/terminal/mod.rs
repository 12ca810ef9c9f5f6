//! Terminal line source
//!
//! [`LineSource`] is the only way the shell reads input or writes output.
//! [`Terminal`] backs it with rustyline and colored. Unit tests use a
//! scripted source that replays canned input and captures output.

mod history;
#[cfg(test)]
mod scripted;

use crate::error::{Error, Result};
use colored::{Color, Colorize};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, Write};
use std::path::PathBuf;

pub use history::history_path;
#[cfg(test)]
pub use scripted::ScriptedTerminal;

/// Foreground/background color pair. `None` keeps the terminal default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
}

impl Style {
    pub const PLAIN: Style = Style { fg: None, bg: None };

    pub fn fg(color: Color) -> Self {
        Self {
            fg: Some(color),
            bg: None,
        }
    }

    pub fn on(self, color: Color) -> Self {
        Self {
            bg: Some(color),
            ..self
        }
    }
}

/// Apply a style with ANSI escapes
pub fn paint(text: &str, style: Style) -> String {
    if style == Style::PLAIN {
        return text.to_string();
    }
    let mut painted = text.normal();
    if let Some(fg) = style.fg {
        painted = painted.color(fg);
    }
    if let Some(bg) = style.bg {
        painted = painted.on_color(bg);
    }
    painted.to_string()
}

pub trait LineSource {
    /// Show `prompt` and block for one line. `Ok(None)` means end of input;
    /// an interrupt is reported as [`Error::Interrupted`].
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    fn write(&mut self, text: &str, style: Style) -> Result<()>;

    fn write_line(&mut self, text: &str, style: Style) -> Result<()> {
        self.write(text, style)?;
        self.write("\n", Style::PLAIN)
    }

    fn clear_screen(&mut self) -> Result<()>;

    fn add_history(&mut self, _entry: &str) {}

    fn save_history(&mut self) {}
}

/// Interactive terminal with line editing and persistent history
pub struct Terminal {
    editor: DefaultEditor,
    history: Option<PathBuf>,
    out: io::Stdout,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut editor = DefaultEditor::new()?;
        let history = history_path();

        if let Some(path) = &history {
            if editor.load_history(path).is_err() {
                tracing::debug!(path = %path.display(), "no history loaded");
            }
        }

        Ok(Self {
            editor,
            history,
            out: io::stdout(),
        })
    }
}

impl LineSource for Terminal {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Interrupted) => Err(Error::Interrupted),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, text: &str, style: Style) -> Result<()> {
        write!(self.out, "{}", paint(text, style))?;
        self.out.flush()?;
        Ok(())
    }

    fn clear_screen(&mut self) -> Result<()> {
        self.editor.clear_screen()?;
        Ok(())
    }

    fn add_history(&mut self, entry: &str) {
        self.editor.add_history_entry(entry).ok();
    }

    fn save_history(&mut self) {
        if let Some(path) = &self.history {
            if let Err(e) = self.editor.save_history(path) {
                tracing::warn!("could not save history: {}", e);
            }
        }
    }
}
