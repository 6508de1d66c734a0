//! CLI command implementations
//!
//! Both commands open the database read-only and verify the `arks`
//! schema before doing anything else. A database that cannot be opened
//! or does not match is fatal.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::db::schema::{ARKS_TABLE, SCHEMA_VERSION};
use crate::db::{ArkStore, SqliteArkStore};
use crate::http_server::{HttpServer, HttpServerConfig};

use super::args::{Command, DatabaseArgs};
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Default log filter when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "arkview=info,tower_http=info";

/// Prefix of SQLAlchemy-style SQLite URIs
const SQLITE_URI_PREFIX: &str = "sqlite:///";

/// Configuration file structure (JSON). Every field is optional;
/// command-line flags and environment variables take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database path or `sqlite:///` URI
    #[serde(default)]
    pub database: Option<String>,

    /// Host to bind to
    #[serde(default)]
    pub host: Option<String>,

    /// Port to bind to
    #[serde(default)]
    pub port: Option<u16>,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))
    }

    /// Load the config file named on the command line, if any
    pub fn from_args(args: &DatabaseArgs) -> CliResult<Self> {
        match &args.config {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Resolve the database path; `--database` / `ARKVIEW_DATABASE` wins
    pub fn database_path(&self, args: &DatabaseArgs) -> CliResult<PathBuf> {
        let uri = args
            .database
            .as_deref()
            .or(self.database.as_deref())
            .filter(|uri| !uri.trim().is_empty())
            .ok_or_else(|| {
                CliError::config_error(
                    "No database configured; pass --database or set ARKVIEW_DATABASE",
                )
            })?;

        Ok(sqlite_path(uri))
    }

    /// Resolve the HTTP server settings; flags win over the file
    pub fn http_config(&self, host: Option<String>, port: Option<u16>) -> HttpServerConfig {
        let defaults = HttpServerConfig::default();
        HttpServerConfig {
            host: host.or_else(|| self.host.clone()).unwrap_or(defaults.host),
            port: port.or(self.port).unwrap_or(defaults.port),
        }
    }
}

/// Turn a path or `sqlite:///path` URI into a filesystem path
pub fn sqlite_path(uri: &str) -> PathBuf {
    PathBuf::from(uri.strip_prefix(SQLITE_URI_PREFIX).unwrap_or(uri))
}

/// Install the global tracing subscriber. Logs go to stderr.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // A subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    init_logging();
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { db, host, port } => serve(&db, host, port),
        Command::Check { db } => check(&db),
    }
}

/// Open the configured database and verify its schema
fn open_store(config: &Config, args: &DatabaseArgs) -> CliResult<SqliteArkStore> {
    let path = config.database_path(args)?;
    Ok(SqliteArkStore::open(&path)?)
}

/// Serve the ark endpoints until the process is stopped
pub fn serve(args: &DatabaseArgs, host: Option<String>, port: Option<u16>) -> CliResult<()> {
    let config = Config::from_args(args)?;
    let store = open_store(&config, args)?;
    info!("Serving {} arks", store.count()?);

    let http_config = config.http_config(host, port);
    let server = HttpServer::with_config(http_config, Arc::new(store));

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })?;

    Ok(())
}

/// Verify the database and report what would be served
pub fn check(args: &DatabaseArgs) -> CliResult<()> {
    let config = Config::from_args(args)?;
    let path = config.database_path(args)?;
    let store = SqliteArkStore::open(&path)?;

    write_response(json!({
        "database": path.display().to_string(),
        "table": ARKS_TABLE,
        "schema_version": SCHEMA_VERSION,
        "records": store.count()?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(database: Option<&str>) -> DatabaseArgs {
        DatabaseArgs {
            config: None,
            database: database.map(str::to_string),
        }
    }

    #[test]
    fn test_sqlite_path() {
        assert_eq!(sqlite_path("arks.db"), PathBuf::from("arks.db"));
        assert_eq!(sqlite_path("sqlite:///data/arks.db"), PathBuf::from("data/arks.db"));
        assert_eq!(sqlite_path("sqlite:////var/arks.db"), PathBuf::from("/var/arks.db"));
    }

    #[test]
    fn test_database_flag_wins() {
        let config = Config {
            database: Some("from-file.db".to_string()),
            ..Default::default()
        };
        let path = config.database_path(&args(Some("from-flag.db"))).unwrap();
        assert_eq!(path, PathBuf::from("from-flag.db"));

        let path = config.database_path(&args(None)).unwrap();
        assert_eq!(path, PathBuf::from("from-file.db"));
    }

    #[test]
    fn test_missing_database_is_config_error() {
        let err = Config::default().database_path(&args(None)).unwrap_err();
        assert_eq!(err.code_str(), "ARKVIEW_CLI_CONFIG_ERROR");

        let err = Config::default().database_path(&args(Some("  "))).unwrap_err();
        assert_eq!(err.code_str(), "ARKVIEW_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_http_config_precedence() {
        let config = Config {
            host: Some("127.0.0.1".to_string()),
            port: Some(7000),
            ..Default::default()
        };

        let http = config.http_config(None, Some(9000));
        assert_eq!(http.host, "127.0.0.1");
        assert_eq!(http.port, 9000);

        let http = Config::default().http_config(None, None);
        assert_eq!(http, HttpServerConfig::default());
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arkview.json");
        fs::write(&path, r#"{"database": "sqlite:///arks.db", "port": 8081}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.database.as_deref(), Some("sqlite:///arks.db"));
        assert_eq!(config.port, Some(8081));
        assert_eq!(config.host, None);
    }

    #[test]
    fn test_load_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arkview.json");
        fs::write(&path, "not json").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert_eq!(err.code_str(), "ARKVIEW_CLI_CONFIG_ERROR");
        assert!(err.message().starts_with("Invalid config JSON"));
    }

    #[test]
    fn test_check_missing_database_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.db");
        let err = check(&args(Some(missing.to_str().unwrap()))).unwrap_err();
        assert_eq!(err.code_str(), "ARKVIEW_CLI_BOOT_FAILED");
    }
}
