//! Interactive chat module
//!
//! Provides a readline-based interactive chat interface for the council.

mod command;
mod repl;

pub use command::ChatCommand;
pub use repl::{ChatRepl, Flow};
