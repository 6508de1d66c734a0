//! # Ark REST API Module
//!
//! Request-level building blocks for the ark endpoints: query parsing,
//! the paginated response envelope, spreadsheet export, and errors.

pub mod errors;
pub mod export;
pub mod parser;
pub mod response;

pub use errors::{RestError, RestResult};
pub use export::build_workbook;
pub use parser::parse_query;
pub use response::PageResponse;
