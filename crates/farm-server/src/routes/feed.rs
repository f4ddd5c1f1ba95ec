//! `/api/feed-stock` and `/api/feed-usage`

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Extension, Router};
use chrono::NaiveDate;
use serde::Deserialize;

use farm_core::dates::today;
use farm_core::feed::{FeedStock, FeedUsage};
use farm_report::feed::{FeedSummary, feed_summary};
use farm_storage::records::feed::{low_stock, restock};

use crate::auth::Actor;
use crate::envelope::{ApiJson, ApiPath, ApiQuery, ApiResponse};
use crate::error::ApiResult;
use crate::query::RangeParams;
use crate::routes::records::resource;
use crate::state::AppState;

const STOCK: &str = "/api/feed-stock";
const USAGE: &str = "/api/feed-usage";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockRequest {
    pub quantity: f64,
    /// Replaces the item's unit cost when given.
    pub unit_cost: Option<f64>,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
}

async fn restock_item(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<String>,
    ApiJson(req): ApiJson<RestockRequest>,
) -> ApiResult<ApiResponse<FeedStock>> {
    let stock = state
        .blocking(move |s| {
            Ok(restock(
                s.store(),
                &id,
                req.quantity,
                req.unit_cost,
                req.date.unwrap_or_else(today),
                &s.record_ctx(actor.name()),
            )?)
        })
        .await?;
    Ok(ApiResponse::ok(stock))
}

async fn low(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<FeedStock>>> {
    let low = state.blocking(|s| Ok(low_stock(s.store())?)).await?;
    Ok(ApiResponse::list(low))
}

async fn summary(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<RangeParams>,
) -> ApiResult<ApiResponse<FeedSummary>> {
    let summary = state
        .blocking(move |s| Ok(feed_summary(s.store(), params.range())?))
        .await?;
    Ok(ApiResponse::ok(summary))
}

pub fn routes() -> Router<AppState> {
    resource::<FeedStock>(STOCK)
        .route(&format!("{STOCK}/low-stock"), get(low))
        .route(&format!("{STOCK}/{{id}}/restock"), post(restock_item))
        .merge(resource::<FeedUsage>(USAGE))
        .route(&format!("{USAGE}/summary"), get(summary))
}
