use anyhow::Result;
use clap::{CommandFactory, Parser};
use colored::Colorize;
use std::io;
use std::process;

use sqlsh::config::DEFAULT_DATABASE;
use sqlsh::driver::{Connection, Interrupter, SqliteConnection};
use sqlsh::interrupt;
use sqlsh::output::{OutputFormat, OutputWriter};
use sqlsh::terminal::Terminal;
use sqlsh::{
    AccessMode, CompletionMode, ConnectionConfig, Error, Interrupts, Session, SessionEnd,
    SqlEngine, StatementBuilder,
};

const LONG_ABOUT: &str = r#"Interactive SQL shell.

Sessions are read-only unless started with --rw. The server is a directory
of SQLite database files (<server>/<database>.db) or :memory:.

QUICK START
═══════════════════════════════════════════════════════════════════════════════

  sqlsh -S ./data                          # Read-only session on ./data/main.db
  sqlsh -S ./data -d sales --rw            # Read-write session on ./data/sales.db
  sqlsh -S ./data -e "SELECT 1" -f json    # Run one statement and exit"#;

const AFTER_LONG_HELP: &str = r#"
SESSION
═══════════════════════════════════════════════════════════════════════════════

  A line ending in ';' runs the statement (unless --batch is given).
  'go' alone or at the end of a line runs everything typed so far.
  An empty line runs the pending statement.
  'USE <name>' switches to <server>/<name>.db.
  'clear' clears the screen, 'exit' ends the session.

OUTPUT FORMATS (with --execute): -f table | json | csv"#;

#[derive(Parser)]
#[command(name = "sqlsh")]
#[command(version)]
#[command(about = "Interactive SQL shell with colored result tables", long_about = LONG_ABOUT)]
#[command(after_long_help = AFTER_LONG_HELP)]
struct Cli {
    /// Data directory holding <database>.db files, or :memory:
    #[arg(short = 'S', long, env = "SQLSH_SERVER")]
    server: Option<String>,

    /// Database to connect to
    #[arg(short, long, env = "SQLSH_DATABASE", default_value = DEFAULT_DATABASE)]
    database: Option<String>,

    /// User name (omit for integrated authentication)
    #[arg(short = 'U', long, env = "SQLSH_USER")]
    user: Option<String>,

    /// Password for --user
    #[arg(short = 'P', long, env = "SQLSH_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Allow INSERT, UPDATE, DELETE, CREATE, ALTER and DROP
    #[arg(long = "rw")]
    read_write: bool,

    /// Only 'go' or an empty line end a statement, so batches can span lines
    #[arg(long)]
    batch: bool,

    /// Enable verbose/debug output
    #[arg(short, long)]
    verbose: bool,

    /// Execute one statement and exit
    #[arg(short, long, value_name = "SQL")]
    execute: Option<String>,

    /// Output format for --execute: table, json, csv
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("sqlsh=debug")
            .with_writer(io::stderr)
            .init();
    }

    let config = match ConnectionConfig::new(
        cli.server,
        cli.database,
        cli.user,
        cli.password,
        AccessMode::from_read_write_flag(cli.read_write),
    ) {
        Ok(config) => config,
        Err(Error::Config(errors)) => {
            for error in errors {
                eprintln!("{}", error.red());
            }
            eprintln!();
            eprintln!("{}", Cli::command().render_help());
            process::exit(2);
        }
        Err(e) => return Err(e.into()),
    };

    tracing::debug!(
        ?config,
        integrated_auth = config.uses_integrated_auth(),
        "starting session"
    );

    let conn = SqliteConnection::open(&config)?;
    let interrupts = Interrupts::new();
    watch_interrupts(&interrupts, conn.interrupter())?;
    let mut engine = SqlEngine::new(conn, config.access_mode);

    if let Some(sql) = cli.execute {
        let code = execute_once(engine, &sql, cli.format, &interrupts)?;
        if code != 0 {
            process::exit(code);
        }
        return Ok(());
    }

    let mode = if cli.batch {
        CompletionMode::Batch
    } else {
        CompletionMode::Semicolon
    };

    let mut terminal = match Terminal::new() {
        Ok(terminal) => terminal,
        Err(e) => {
            if let Err(close_err) = engine.close() {
                tracing::warn!("failed to close connection: {}", close_err);
            }
            return Err(e.into());
        }
    };
    let mut session =
        Session::new(engine, StatementBuilder::new(mode), &config).with_interrupts(interrupts);
    let end = session.run(&mut terminal)?;

    let code = end.exit_code();
    if code != 0 {
        process::exit(code);
    }
    Ok(())
}

/// Ctrl-C during a statement cancels it through the driver. Anywhere else
/// (the line editor handles it at an interactive prompt) it ends the process.
fn watch_interrupts(interrupts: &Interrupts, interrupter: Interrupter) -> Result<()> {
    interrupt::watch_ctrl_c(interrupts.clone(), move |running| {
        if running {
            interrupter.interrupt();
        } else {
            process::exit(SessionEnd::Interrupted.exit_code());
        }
    })?;
    Ok(())
}

/// Run a single statement and print it in the requested format. Returns
/// the exit code: 1 when the statement failed or was rejected, 130 when it
/// was interrupted.
fn execute_once<C: Connection>(
    mut engine: SqlEngine<C>,
    sql: &str,
    format: OutputFormat,
    interrupts: &Interrupts,
) -> Result<i32> {
    let result = interrupts.while_running(|| engine.execute_command(sql));

    let written = match &result.error_message {
        Some(message) => {
            eprintln!("{}", message.red());
            Ok(1)
        }
        None => OutputWriter::new(io::stdout().lock(), format)
            .write_result(&result)
            .map(|_| 0),
    };

    if let Err(e) = engine.close() {
        tracing::warn!("failed to close connection: {}", e);
    }

    if interrupts.is_requested() {
        return Ok(SessionEnd::Interrupted.exit_code());
    }
    Ok(written?)
}
