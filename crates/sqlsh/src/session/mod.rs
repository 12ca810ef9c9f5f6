//! Interactive session loop
//!
//! Prompt, accumulate, dispatch, print, repeat. The session owns the
//! engine and the current-database label shown in the prompt.

use crate::config::{AccessMode, ConnectionConfig};
use crate::driver::Connection;
use crate::error::{Error, Result};
use crate::format;
use crate::interrupt::Interrupts;
use crate::sql::{ExecutionResult, SqlEngine};
use crate::statement::{ControlCommand, Input, StatementBuilder};
use crate::terminal::{LineSource, Style};
use colored::Color;

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Exit,
    EndOfInput,
    Interrupted,
}

impl SessionEnd {
    pub fn exit_code(self) -> i32 {
        match self {
            SessionEnd::Exit | SessionEnd::EndOfInput => 0,
            SessionEnd::Interrupted => 130,
        }
    }
}

pub struct Session<C: Connection> {
    engine: SqlEngine<C>,
    builder: StatementBuilder,
    server: String,
    current_database: String,
    interrupts: Interrupts,
}

impl<C: Connection> Session<C> {
    pub fn new(engine: SqlEngine<C>, builder: StatementBuilder, config: &ConnectionConfig) -> Self {
        Self {
            engine,
            builder,
            server: config.server.clone(),
            current_database: config.database.clone(),
            interrupts: Interrupts::default(),
        }
    }

    /// Share interrupt state with a signal watcher. A statement interrupted
    /// while running ends the session after its result is printed.
    pub fn with_interrupts(mut self, interrupts: Interrupts) -> Self {
        self.interrupts = interrupts;
        self
    }

    /// Run until `exit`, end of input or an interrupt. History is saved and
    /// the connection closed however the loop ends.
    pub fn run(&mut self, source: &mut dyn LineSource) -> Result<SessionEnd> {
        let outcome = self.run_loop(source);
        source.save_history();
        self.release();

        if let Ok(end) = &outcome {
            tracing::debug!(?end, "session finished");
        }
        outcome
    }

    fn run_loop(&mut self, source: &mut dyn LineSource) -> Result<SessionEnd> {
        print_banner(
            source,
            &self.server,
            &self.current_database,
            self.engine.access_mode(),
        )?;

        loop {
            let input = match self.builder.build(source, Some(self.current_database.as_str())) {
                Ok(input) => input,
                Err(Error::Interrupted) => return Ok(SessionEnd::Interrupted),
                Err(e) => return Err(e),
            };

            match input {
                Input::Control(ControlCommand::Exit) => return Ok(SessionEnd::Exit),
                Input::Control(ControlCommand::Clear) => source.clear_screen()?,
                Input::EndOfInput => return Ok(SessionEnd::EndOfInput),
                Input::Statement(sql) if sql.is_empty() => continue,
                Input::Statement(sql) => {
                    source.add_history(&sql);
                    let result = self
                        .interrupts
                        .while_running(|| self.engine.execute_command(&sql));
                    if let Some(database) = &result.database_changed {
                        self.current_database = database.clone();
                    }
                    print_result(source, &result)?;

                    if self.interrupts.is_requested() {
                        return Ok(SessionEnd::Interrupted);
                    }
                }
            }
        }
    }

    fn release(&mut self) {
        if let Err(e) = self.engine.close() {
            tracing::warn!("failed to close connection: {}", e);
        }
    }
}

/// `Connected to <server> at <database>, mode=<mode>`
pub fn print_banner(
    source: &mut dyn LineSource,
    server: &str,
    database: &str,
    mode: AccessMode,
) -> Result<()> {
    let mode_style = match mode {
        AccessMode::ReadWrite => Style::fg(Color::Yellow).on(Color::Red),
        AccessMode::ReadOnly => Style::fg(Color::Green),
    };

    source.write(
        &format!("Connected to {} at {}, mode=", server, database),
        Style::PLAIN,
    )?;
    source.write(&mode.to_string(), mode_style)?;
    source.write_line("", Style::PLAIN)
}

/// Errors in red, otherwise the rendered table and its summary line.
pub fn print_result(source: &mut dyn LineSource, result: &ExecutionResult) -> Result<()> {
    if let Some(message) = &result.error_message {
        return source.write_line(message, Style::fg(Color::Red));
    }

    for line in format::render(result) {
        for segment in &line {
            source.write(&segment.text, segment.style)?;
        }
        source.write_line("", Style::PLAIN)?;
    }

    if let Some(summary) = format::summary(result) {
        source.write_line(&summary, Style::PLAIN)?;
    }
    Ok(())
}
