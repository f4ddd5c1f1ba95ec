//! CRUD handlers shared by every record resource.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Router};
use tracing::info;

use farm_core::egg::EggProductionRecord;
use farm_core::feed::{FeedStock, FeedUsage};
use farm_core::finance::FinancialRecord;
use farm_core::sales::SalesOrder;
use farm_core::task::Task;
use farm_storage::records::Record;
use farm_storage::typed::Documents;

use crate::auth::Actor;
use crate::envelope::{ApiJson, ApiPath, ApiQuery, ApiResponse, created};
use crate::error::ApiResult;
use crate::query::{Filter, ListParams};
use crate::state::AppState;

/// A record type exposed under `/api/<slug>`.
pub trait Resource: Record {
    /// Query-string filters the list endpoint honours.
    const FILTERS: &'static [Filter];
}

impl Resource for EggProductionRecord {
    const FILTERS: &'static [Filter] = &[Filter::Tag("house")];
}

impl Resource for SalesOrder {
    const FILTERS: &'static [Filter] =
        &[Filter::Exact("status"), Filter::Exact("paymentStatus")];
}

impl Resource for FeedStock {
    const FILTERS: &'static [Filter] = &[Filter::Tag("feedType")];
}

impl Resource for FeedUsage {
    const FILTERS: &'static [Filter] = &[Filter::Tag("feedType"), Filter::Tag("house")];
}

impl Resource for FinancialRecord {
    const FILTERS: &'static [Filter] = &[Filter::Exact("recordType"), Filter::Tag("category")];
}

impl Resource for Task {
    const FILTERS: &'static [Filter] = &[
        Filter::Exact("status"),
        Filter::Exact("category"),
        Filter::Exact("priority"),
        Filter::Tag("assignedTo"),
    ];
}

pub async fn list<D: Resource>(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<ApiResponse<Vec<D>>> {
    let records = state
        .blocking(move |s| Ok(s.store().find::<D>(&params.query(D::FILTERS))?))
        .await?;
    Ok(ApiResponse::list(records))
}

pub async fn fetch<D: Resource>(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<ApiResponse<D>> {
    let doc = state.blocking(move |s| Ok(s.store().get::<D>(&id)?)).await?;
    Ok(ApiResponse::ok(doc))
}

pub async fn create<D: Resource>(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(doc): ApiJson<D>,
) -> ApiResult<impl IntoResponse> {
    let by = actor.name().to_owned();
    let doc = state
        .blocking(move |s| Ok(D::create(s.store(), doc, &s.record_ctx(actor.name()))?))
        .await?;
    info!(collection = D::COLLECTION, id = doc.id(), actor = %by, "created");
    Ok(created(doc))
}

pub async fn update<D: Resource>(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<String>,
    ApiJson(doc): ApiJson<D>,
) -> ApiResult<ApiResponse<D>> {
    let by = actor.name().to_owned();
    let doc = state
        .blocking(move |s| Ok(D::update(s.store(), &id, doc, &s.record_ctx(actor.name()))?))
        .await?;
    info!(collection = D::COLLECTION, id = doc.id(), actor = %by, "updated");
    Ok(ApiResponse::ok(doc))
}

pub async fn remove<D: Resource>(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<ApiResponse<D>> {
    actor.require_delete()?;
    let by = actor.name().to_owned();
    let doc = state
        .blocking(move |s| Ok(D::remove(s.store(), &id, &s.record_ctx(actor.name()))?))
        .await?;
    info!(collection = D::COLLECTION, id = doc.id(), actor = %by, "deleted");
    Ok(ApiResponse::ok(doc))
}

/// `GET|POST {base}` and `GET|PUT|DELETE {base}/{id}`.
pub fn resource<D: Resource>(base: &str) -> Router<AppState> {
    Router::new()
        .route(base, get(list::<D>).post(create::<D>))
        .route(
            &format!("{base}/{{id}}"),
            get(fetch::<D>).put(update::<D>).delete(remove::<D>),
        )
}
