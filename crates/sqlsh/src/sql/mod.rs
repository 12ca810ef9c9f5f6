//! Statement dispatch
//!
//! [`SqlEngine`] applies the access guard, routes a statement to the
//! row-returning or non-row-returning path and always hands back an
//! [`ExecutionResult`], never an error.

mod engine;
pub mod guard;
mod result;

pub use engine::{SqlEngine, NULL_TOKEN};
pub use guard::{AccessGuard, GuardVerdict};
pub use result::ExecutionResult;
