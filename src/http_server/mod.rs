//! # Ark HTTP Server Module
//!
//! Axum server exposing the `arks` table.
//!
//! # Endpoints
//!
//! - `/` - Paginated JSON listing with filtering and sorting
//! - `/download` - Spreadsheet export of every record
//! - `/health` - Health check

pub mod ark_routes;
pub mod config;
pub mod observability_routes;
pub mod server;

pub use ark_routes::{ark_routes, ArkState};
pub use config::HttpServerConfig;
pub use server::HttpServer;
