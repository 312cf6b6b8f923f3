//! Interactive shell and script-mode command loop.

pub mod context;
pub mod output;
pub mod shell;

pub use context::{LoopControl, ShellContext};
pub use shell::run_cli;
