//! Trayecto CLI library.
//!
//! Configuration profiles, argument parsing, output formatting and the
//! interactive REPL for the `trayecto` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod repl;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
