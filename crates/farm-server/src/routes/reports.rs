//! Dashboard, search, CSV reports and the activity log.

use axum::Router;
use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::routing::get;
use serde::Deserialize;

use farm_core::activity::ActivityEntry;
use farm_core::collection::Collection;
use farm_core::dates::today;
use farm_report::csv::export_csv;
use farm_report::dashboard::{Dashboard, dashboard};
use farm_report::search::{SearchHit, search};
use farm_storage::Storage;

use crate::envelope::{ApiPath, ApiQuery, ApiResponse};
use crate::error::{ApiError, ApiResult};
use crate::query::RangeParams;
use crate::state::AppState;

const DEFAULT_ACTIVITY: usize = 50;
const MAX_ACTIVITY: usize = 500;

async fn show_dashboard(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<RangeParams>,
) -> ApiResult<ApiResponse<Dashboard>> {
    let board = state
        .blocking(move |s| Ok(dashboard(s.store(), params.range(), today())?))
        .await?;
    Ok(ApiResponse::ok(board))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

async fn run_search(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> ApiResult<ApiResponse<Vec<SearchHit>>> {
    let hits = state
        .blocking(move |s| Ok(search(s.store(), &params.q, params.limit)?))
        .await?;
    Ok(ApiResponse::list(hits))
}

/// `GET /api/reports/{collection}.csv`
async fn csv_report(
    State(state): State<AppState>,
    ApiPath(file): ApiPath<String>,
    ApiQuery(params): ApiQuery<RangeParams>,
) -> ApiResult<impl IntoResponse> {
    let Some(name) = file.strip_suffix(".csv") else {
        return Err(ApiError::NotFound(format!("no report named {file:?}")));
    };
    let collection = name
        .parse::<Collection>()
        .map_err(|e| ApiError::NotFound(e.to_string()))?;
    let body = state
        .blocking(move |s| Ok(export_csv(s.store(), collection, params.range())?.body))
        .await?;
    let disposition = format!("attachment; filename=\"{}.csv\"", collection.slug());
    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

#[derive(Debug, Deserialize)]
pub struct ActivityParams {
    pub collection: Option<String>,
    pub limit: Option<usize>,
}

async fn activity(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ActivityParams>,
) -> ApiResult<ApiResponse<Vec<ActivityEntry>>> {
    let collection = match params.collection.as_deref() {
        Some(c) => Some(
            c.parse::<Collection>()
                .map_err(|e| ApiError::bad_request(e.to_string()))?,
        ),
        None => None,
    };
    let limit = params.limit.unwrap_or(DEFAULT_ACTIVITY).min(MAX_ACTIVITY);
    let entries = state
        .blocking(move |s| {
            Ok(s.store()
                .recent_activity(collection.map(Collection::name), limit)?)
        })
        .await?;
    Ok(ApiResponse::list(entries))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/dashboard", get(show_dashboard))
        .route("/api/search", get(run_search))
        .route("/api/reports/{file}", get(csv_report))
        .route("/api/activity", get(activity))
}
