//! CLI module for the sentiment CLI tool
//!
//! Command handlers live in [`commands`], one module per subcommand.

pub mod commands;

pub use commands::{handle_evaluate_command, handle_run_command};
