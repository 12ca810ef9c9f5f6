//! Ctrl-C while a statement runs
//!
//! At the prompt the line editor reports Ctrl-C itself. A signal that
//! arrives while a statement is running cancels the statement, and the
//! session ends once control is back in the loop.

use crate::error::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Default)]
struct State {
    requested: AtomicBool,
    running: AtomicBool,
}

/// Interrupt state shared by the signal watcher and the session loop
#[derive(Debug, Clone, Default)]
pub struct Interrupts {
    state: Arc<State>,
}

impl Interrupts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an interrupt. Returns whether a statement was running.
    pub fn request(&self) -> bool {
        self.state.requested.store(true, Ordering::SeqCst);
        self.state.running.load(Ordering::SeqCst)
    }

    pub fn is_requested(&self) -> bool {
        self.state.requested.load(Ordering::SeqCst)
    }

    /// Run `f` marked as a running statement.
    pub fn while_running<T>(&self, f: impl FnOnce() -> T) -> T {
        self.state.running.store(true, Ordering::SeqCst);
        let outcome = f();
        self.state.running.store(false, Ordering::SeqCst);
        outcome
    }
}

/// Watch for Ctrl-C on a background thread.
///
/// Every signal is recorded on `interrupts`, then `on_interrupt` is called
/// with whether a statement was running at the time.
pub fn watch_ctrl_c<F>(interrupts: Interrupts, on_interrupt: F) -> Result<()>
where
    F: Fn(bool) + Send + 'static,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    thread::Builder::new()
        .name("sqlsh-ctrl-c".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                while tokio::signal::ctrl_c().await.is_ok() {
                    let running = interrupts.request();
                    tracing::debug!(running, "interrupt received");
                    on_interrupt(running);
                }
            });
        })?;

    Ok(())
}
