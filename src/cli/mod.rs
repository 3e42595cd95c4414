//! Command line interface for kodegen_bundler_cross.
//!
//! Parses the platform command, runs it, and reports the outcome.

mod args;
pub mod commands;
mod output;

pub use args::{Args, Command, CommonFlags};
pub use commands::{PlatformCommand, execute_command};
pub use output::OutputManager;
