//! CLI argument definitions using clap
//!
//! Commands:
//! - arkview serve --database <path> [--host <host>] [--port <port>]
//! - arkview check --database <path>

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// arkview - browse and export ARK identifier records over HTTP
#[derive(Parser, Debug)]
#[command(name = "arkview")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Options locating the database
#[derive(Args, Debug, Clone, Default)]
pub struct DatabaseArgs {
    /// Path to a JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// SQLite database holding the arks table (path or sqlite:/// URI)
    #[arg(long, env = "ARKVIEW_DATABASE")]
    pub database: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the listing and export endpoints
    Serve {
        #[command(flatten)]
        db: DatabaseArgs,

        /// Host to bind to
        #[arg(long, env = "ARKVIEW_HOST")]
        host: Option<String>,

        /// Port to bind to
        #[arg(long, env = "ARKVIEW_PORT")]
        port: Option<u16>,
    },

    /// Verify the database schema, print the record count and exit
    Check {
        #[command(flatten)]
        db: DatabaseArgs,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
