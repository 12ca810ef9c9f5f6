//! Statement accumulation
//!
//! Reads lines until a statement is complete:
//!
//! - a blank line submits whatever is buffered (possibly nothing)
//! - `go` alone on a line, or as the last word of a line, submits the buffer
//!   without the keyword
//! - in [`CompletionMode::Semicolon`] a line ending in `;` submits the buffer
//!   including that line
//! - `exit` or `clear` on a line of their own abandon the buffer and are
//!   returned as a [`ControlCommand`]
//!
//! Lines are joined with a single space and kept as typed otherwise; only
//! the assembled statement is trimmed.

use crate::error::Result;
use crate::terminal::LineSource;
use std::fmt;

pub const PRIMARY_PROMPT: &str = "sqlsh";
pub const CONTINUATION_PROMPT: &str = "    ... ";
pub const BATCH_TERMINATOR: &str = "go";
pub const STATEMENT_TERMINATOR: char = ';';

/// Which line endings complete a statement besides `go` and a blank line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionMode {
    /// A trailing `;` also completes the statement
    #[default]
    Semicolon,
    /// Only `go` or a blank line do; `;` just separates statements in a batch
    Batch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Exit,
    Clear,
}

impl ControlCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.eq_ignore_ascii_case("exit") {
            Some(ControlCommand::Exit)
        } else if line.eq_ignore_ascii_case("clear") {
            Some(ControlCommand::Clear)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ControlCommand::Exit => "exit",
            ControlCommand::Clear => "clear",
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one prompt cycle produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Statement(String),
    Control(ControlCommand),
    EndOfInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingFirstLine,
    AwaitingContinuation,
    Complete,
}

/// How a single line affects the pending statement
#[derive(Debug, PartialEq, Eq)]
enum LineKind<'a> {
    Blank,
    Terminator,
    /// Text followed by a trailing `go`
    TerminatedByKeyword(&'a str),
    /// Text ending in `;`
    TerminatedByChar(&'a str),
    Fragment(&'a str),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatementBuilder {
    mode: CompletionMode,
}

impl StatementBuilder {
    pub fn new(mode: CompletionMode) -> Self {
        Self { mode }
    }

    /// Prompt for and assemble the next statement.
    ///
    /// `current_database` decorates the primary prompt. End of input before
    /// completion abandons the buffer.
    pub fn build(
        &self,
        source: &mut dyn LineSource,
        current_database: Option<&str>,
    ) -> Result<Input> {
        let mut buffer = String::new();
        let mut state = State::AwaitingFirstLine;

        while state != State::Complete {
            let prompt = match state {
                State::AwaitingFirstLine => primary_prompt(current_database),
                _ => CONTINUATION_PROMPT.to_string(),
            };

            let Some(line) = source.read_line(&prompt)? else {
                return Ok(Input::EndOfInput);
            };

            if let Some(command) = ControlCommand::parse(&line) {
                return Ok(Input::Control(command));
            }

            state = match self.classify_line(&line) {
                LineKind::Blank | LineKind::Terminator => State::Complete,
                LineKind::TerminatedByKeyword(text) | LineKind::TerminatedByChar(text) => {
                    append(&mut buffer, text);
                    State::Complete
                }
                LineKind::Fragment(text) => {
                    append(&mut buffer, text);
                    State::AwaitingContinuation
                }
            };
        }

        Ok(Input::Statement(buffer.trim().to_string()))
    }

    /// Decide on the trimmed line, but hand back the line as typed so
    /// whitespace inside a multi-line literal survives.
    fn classify_line<'a>(&self, line: &'a str) -> LineKind<'a> {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            return LineKind::Blank;
        }

        if trimmed.eq_ignore_ascii_case(BATCH_TERMINATOR) {
            return LineKind::Terminator;
        }

        let ended = line.trim_end();
        if let Some((text, last)) = ended.rsplit_once(char::is_whitespace) {
            if last.eq_ignore_ascii_case(BATCH_TERMINATOR) {
                return LineKind::TerminatedByKeyword(text.trim_end());
            }
        }

        if self.mode == CompletionMode::Semicolon && ended.ends_with(STATEMENT_TERMINATOR) {
            return LineKind::TerminatedByChar(ended);
        }

        LineKind::Fragment(line)
    }
}

fn primary_prompt(current_database: Option<&str>) -> String {
    match current_database {
        Some(db) if !db.is_empty() => format!("{} [{}]> ", PRIMARY_PROMPT, db),
        _ => format!("{}> ", PRIMARY_PROMPT),
    }
}

fn append(buffer: &mut String, fragment: &str) {
    if !buffer.is_empty() {
        buffer.push(' ');
    }
    buffer.push_str(fragment);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::ScriptedTerminal;

    fn build(mode: CompletionMode, lines: &[&str]) -> (Input, ScriptedTerminal) {
        let mut terminal = ScriptedTerminal::new(lines.iter().copied());
        let input = StatementBuilder::new(mode)
            .build(&mut terminal, None)
            .unwrap();
        (input, terminal)
    }

    fn statement(s: &str) -> Input {
        Input::Statement(s.to_string())
    }

    #[test]
    fn test_exit_command_returns_exit() {
        let (input, _) = build(CompletionMode::Semicolon, &["EXIT"]);
        assert_eq!(input, Input::Control(ControlCommand::Exit));
    }

    #[test]
    fn test_clear_command_returns_clear() {
        let (input, _) = build(CompletionMode::Semicolon, &["Clear"]);
        assert_eq!(input, Input::Control(ControlCommand::Clear));
        assert_eq!(ControlCommand::Clear.to_string(), "clear");
    }

    #[test]
    fn test_control_word_discards_buffer() {
        let (input, terminal) = build(CompletionMode::Semicolon, &["SELECT *", "FROM t", "exit"]);
        assert_eq!(input, Input::Control(ControlCommand::Exit));
        assert_eq!(terminal.remaining_input(), 0);
    }

    #[test]
    fn test_control_word_inside_a_line_is_sql() {
        let (input, _) = build(CompletionMode::Semicolon, &["SELECT exit FROM t;"]);
        assert_eq!(input, statement("SELECT exit FROM t;"));
    }

    #[test]
    fn test_single_line_with_semicolon() {
        let (input, terminal) = build(CompletionMode::Semicolon, &["SELECT 1;"]);
        assert_eq!(input, statement("SELECT 1;"));
        assert_eq!(terminal.prompts(), &["sqlsh> ".to_string()]);
    }

    #[test]
    fn test_single_line_with_trailing_go() {
        let (input, _) = build(CompletionMode::Semicolon, &["SELECT foo FROM bar go"]);
        assert_eq!(input, statement("SELECT foo FROM bar"));
    }

    #[test]
    fn test_go_on_separate_line() {
        let (input, _) = build(CompletionMode::Semicolon, &["SELECT foo FROM bar", "go"]);
        assert_eq!(input, statement("SELECT foo FROM bar"));
    }

    #[test]
    fn test_multiline_statement_with_go() {
        let (input, terminal) = build(CompletionMode::Semicolon, &["SELECT foo", "FROM bar", "GO"]);
        assert_eq!(input, statement("SELECT foo FROM bar"));
        assert_eq!(
            terminal.prompts(),
            &[
                "sqlsh> ".to_string(),
                CONTINUATION_PROMPT.to_string(),
                CONTINUATION_PROMPT.to_string()
            ]
        );
    }

    #[test]
    fn test_word_ending_in_go_is_not_a_terminator() {
        let (input, _) = build(CompletionMode::Semicolon, &["SELECT * FROM cargo", "go"]);
        assert_eq!(input, statement("SELECT * FROM cargo"));
    }

    #[test]
    fn test_complex_multiline_batch() {
        let (input, _) = build(
            CompletionMode::Batch,
            &[
                "USE myDatabase;",
                "INSERT INTO FOO(SOME_VALUE)",
                "VALUES('THIS VALUE');",
                "SELECT * FROM FOO",
                "WHERE SOME_VALUE='THIS_VALUE';",
                "go",
            ],
        );
        assert_eq!(
            input,
            statement(
                "USE myDatabase; \
                 INSERT INTO FOO(SOME_VALUE) VALUES('THIS VALUE'); \
                 SELECT * FROM FOO WHERE SOME_VALUE='THIS_VALUE';"
            )
        );
    }

    #[test]
    fn test_semicolon_mode_stops_at_first_terminated_line() {
        let (input, terminal) =
            build(CompletionMode::Semicolon, &["USE myDatabase;", "SELECT 1;"]);
        assert_eq!(input, statement("USE myDatabase;"));
        assert_eq!(terminal.remaining_input(), 1);
    }

    #[test]
    fn test_blank_line_submits_buffer() {
        let (input, _) = build(CompletionMode::Batch, &["SELECT 1", "  "]);
        assert_eq!(input, statement("SELECT 1"));
    }

    #[test]
    fn test_blank_first_line_submits_empty_statement() {
        let (input, _) = build(CompletionMode::Semicolon, &[""]);
        assert_eq!(input, statement(""));
    }

    #[test]
    fn test_unterminated_lines_keep_prompting() {
        let lines = ["SELECT a,", "b,", "c", "FROM t", "WHERE a = 1"];
        let (input, terminal) = build(CompletionMode::Semicolon, &lines);

        assert_eq!(input, Input::EndOfInput);
        // one read per line plus the final read that hit end of input
        assert_eq!(terminal.prompts().len(), lines.len() + 1);
        assert!(terminal.prompts()[1..]
            .iter()
            .all(|p| p == CONTINUATION_PROMPT));
    }

    #[test]
    fn test_statement_is_trimmed_at_both_ends() {
        let (input, _) = build(CompletionMode::Semicolon, &["  SELECT a", "FROM t ;  "]);
        assert_eq!(input, statement("SELECT a FROM t ;"));
    }

    #[test]
    fn test_whitespace_inside_multiline_literal_is_kept() {
        let (input, _) = build(CompletionMode::Semicolon, &["SELECT 'a   ", "  b';"]);
        assert_eq!(input, statement("SELECT 'a      b';"));
    }

    #[test]
    fn test_leading_indent_survives_trailing_go() {
        let (input, _) = build(CompletionMode::Batch, &["SELECT 'x", "    y' go"]);
        assert_eq!(input, statement("SELECT 'x     y'"));
    }

    #[test]
    fn test_prompt_shows_current_database() {
        let mut terminal = ScriptedTerminal::new(["SELECT 1;"]);
        StatementBuilder::default()
            .build(&mut terminal, Some("sales"))
            .unwrap();
        assert_eq!(terminal.prompts(), &["sqlsh [sales]> ".to_string()]);
    }

    #[test]
    fn test_interrupt_is_propagated() {
        let mut terminal = ScriptedTerminal::new(["SELECT 1"]).interrupt_at_end();
        let result = StatementBuilder::default().build(&mut terminal, None);
        assert!(matches!(result, Err(crate::Error::Interrupted)));
    }
}
