//! Ark HTTP Routes
//!
//! - `GET /` - filtered, sorted, paginated records as JSON
//! - `GET /download` - every record as an `.xlsx` attachment

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::{debug, info};

use crate::db::{ArkRecord, ArkStore};
use crate::rest_api::export::{content_disposition, XLSX_CONTENT_TYPE};
use crate::rest_api::{build_workbook, parse_query, PageResponse, RestError, RestResult};

// ==================
// Shared State
// ==================

/// Ark state shared across handlers
pub struct ArkState {
    pub store: Arc<dyn ArkStore>,
}

impl ArkState {
    pub fn new(store: Arc<dyn ArkStore>) -> Self {
        Self { store }
    }
}

// ==================
// Ark Routes
// ==================

/// Create ark routes
pub fn ark_routes(state: Arc<ArkState>) -> Router {
    Router::new()
        .route("/", get(list_handler))
        .route("/download", get(download_handler))
        .with_state(state)
}

/// Run store and workbook work off the async executor
async fn run_blocking<F, T>(f: F) -> RestResult<T>
where
    F: FnOnce() -> RestResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| RestError::Internal(format!("Blocking task failed: {}", e)))?
}

// ==================
// Handlers
// ==================

/// List records handler
async fn list_handler(
    State(state): State<Arc<ArkState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<PageResponse<ArkRecord>>, RestError> {
    let query = parse_query(&params)?;
    debug!(?query, "Listing arks");

    let store = state.store.clone();
    let response = run_blocking(move || {
        let page = store.page(&query)?;
        Ok(PageResponse::from_page(&query, page))
    })
    .await?;

    Ok(Json(response))
}

/// Spreadsheet download handler. Query parameters are ignored.
async fn download_handler(State(state): State<Arc<ArkState>>) -> Result<Response, RestError> {
    let store = state.store.clone();
    let workbook = run_blocking(move || {
        let records = store.all()?;
        info!("Exporting {} arks", records.len());
        build_workbook(&records)
    })
    .await?;

    let headers = [
        (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
        (header::CONTENT_DISPOSITION, content_disposition()),
    ];
    Ok((headers, workbook).into_response())
}
