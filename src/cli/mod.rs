//! CLI module for arkview
//!
//! Provides command-line interface for:
//! - serve: Verify the database and serve the HTTP endpoints
//! - check: Verify the database and report its record count

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, DatabaseArgs};
pub use commands::{check, init_logging, run, run_command, serve, sqlite_path, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_response, write_response_to};
