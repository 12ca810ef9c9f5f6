use super::{LineSource, Style};
use crate::error::{Error, Result};
use std::collections::VecDeque;

/// Replays a fixed list of input lines and records everything written.
///
/// Styles are dropped from the captured output. Once the script runs out,
/// reads report end of input, or an interrupt if built with
/// [`ScriptedTerminal::interrupt_at_end`].
#[derive(Debug, Default)]
pub struct ScriptedTerminal {
    input: VecDeque<String>,
    output: String,
    prompts: Vec<String>,
    history: Vec<String>,
    clear_count: usize,
    interrupt_at_end: bool,
}

impl ScriptedTerminal {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn interrupt_at_end(mut self) -> Self {
        self.interrupt_at_end = true;
        self
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn clear_count(&self) -> usize {
        self.clear_count
    }

    pub fn remaining_input(&self) -> usize {
        self.input.len()
    }
}

impl LineSource for ScriptedTerminal {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        match self.input.pop_front() {
            Some(line) => Ok(Some(line)),
            None if self.interrupt_at_end => Err(Error::Interrupted),
            None => Ok(None),
        }
    }

    fn write(&mut self, text: &str, _style: Style) -> Result<()> {
        self.output.push_str(text);
        Ok(())
    }

    fn clear_screen(&mut self) -> Result<()> {
        self.clear_count += 1;
        Ok(())
    }

    fn add_history(&mut self, entry: &str) {
        self.history.push(entry.to_string());
    }
}
