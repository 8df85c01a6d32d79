//! Command handlers for the sentiment CLI

pub mod evaluate;
pub mod run;

pub use evaluate::handle_evaluate_command;
pub use run::handle_run_command;
