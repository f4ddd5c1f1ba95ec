//! `/api/sales-orders`

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use serde::Serialize;

use farm_core::sales::SalesOrder;
use farm_report::sales::{SalesSummary, sales_summary};
use farm_storage::records::sales::next_order_number;

use crate::envelope::{ApiQuery, ApiResponse};
use crate::error::ApiResult;
use crate::query::RangeParams;
use crate::routes::records::resource;
use crate::state::AppState;

const BASE: &str = "/api/sales-orders";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextOrderNumber {
    pub order_number: String,
}

async fn next_order(State(state): State<AppState>) -> ApiResult<ApiResponse<NextOrderNumber>> {
    let order_number = state
        .blocking(|s| Ok(next_order_number(s.store(), &s.config.numbering)?))
        .await?;
    Ok(ApiResponse::ok(NextOrderNumber { order_number }))
}

async fn summary(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<RangeParams>,
) -> ApiResult<ApiResponse<SalesSummary>> {
    let summary = state
        .blocking(move |s| Ok(sales_summary(s.store(), params.range())?))
        .await?;
    Ok(ApiResponse::ok(summary))
}

pub fn routes() -> Router<AppState> {
    resource::<SalesOrder>(BASE)
        .route(&format!("{BASE}/next-order-number"), get(next_order))
        .route(&format!("{BASE}/summary"), get(summary))
}
