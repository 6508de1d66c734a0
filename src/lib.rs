//! arkview - a read-only HTTP browser for ARK identifier records
//!
//! Serves the `arks` table of an existing SQLite database as paginated,
//! filterable, sortable JSON and as a spreadsheet download.

pub mod cli;
pub mod db;
pub mod http_server;
pub mod rest_api;
