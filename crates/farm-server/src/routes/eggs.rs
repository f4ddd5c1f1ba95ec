//! `/api/egg-production`

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use serde::Serialize;

use farm_core::egg::EggProductionRecord;
use farm_report::eggs::{EggSummary, egg_summary};
use farm_storage::records::egg::next_batch_number;

use crate::envelope::{ApiQuery, ApiResponse};
use crate::error::ApiResult;
use crate::query::RangeParams;
use crate::routes::records::resource;
use crate::state::AppState;

const BASE: &str = "/api/egg-production";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextBatchNumber {
    pub batch_number: String,
}

async fn next_batch(State(state): State<AppState>) -> ApiResult<ApiResponse<NextBatchNumber>> {
    let batch_number = state
        .blocking(|s| Ok(next_batch_number(s.store(), &s.config.numbering)?))
        .await?;
    Ok(ApiResponse::ok(NextBatchNumber { batch_number }))
}

async fn summary(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<RangeParams>,
) -> ApiResult<ApiResponse<EggSummary>> {
    let summary = state
        .blocking(move |s| Ok(egg_summary(s.store(), params.range())?))
        .await?;
    Ok(ApiResponse::ok(summary))
}

pub fn routes() -> Router<AppState> {
    resource::<EggProductionRecord>(BASE)
        .route(&format!("{BASE}/next-batch-number"), get(next_batch))
        .route(&format!("{BASE}/summary"), get(summary))
}
