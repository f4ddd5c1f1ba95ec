//! `/api/financial-records`

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use serde::Serialize;

use farm_core::finance::FinancialRecord;
use farm_report::finance::{FinanceSummary, finance_summary};
use farm_storage::records::finance::next_reference_number;

use crate::envelope::{ApiQuery, ApiResponse};
use crate::error::ApiResult;
use crate::query::RangeParams;
use crate::routes::records::resource;
use crate::state::AppState;

const BASE: &str = "/api/financial-records";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextReferenceNumber {
    pub reference_number: String,
}

async fn next_reference(
    State(state): State<AppState>,
) -> ApiResult<ApiResponse<NextReferenceNumber>> {
    let reference_number = state
        .blocking(|s| Ok(next_reference_number(s.store(), &s.config.numbering)?))
        .await?;
    Ok(ApiResponse::ok(NextReferenceNumber { reference_number }))
}

async fn summary(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<RangeParams>,
) -> ApiResult<ApiResponse<FinanceSummary>> {
    let summary = state
        .blocking(move |s| Ok(finance_summary(s.store(), params.range())?))
        .await?;
    Ok(ApiResponse::ok(summary))
}

pub fn routes() -> Router<AppState> {
    resource::<FinancialRecord>(BASE)
        .route(&format!("{BASE}/next-reference-number"), get(next_reference))
        .route(&format!("{BASE}/summary"), get(summary))
}
