//! `/api/task-scheduling`

use axum::extract::State;
use axum::routing::{get, patch};
use axum::{Extension, Router};
use serde::Deserialize;

use farm_core::dates::today;
use farm_core::enums::TaskStatus;
use farm_core::task::Task;
use farm_report::tasks::{TaskSummary, task_summary};
use farm_storage::records::tasks::{TaskStatusChange, overdue_tasks, set_task_status};

use crate::auth::Actor;
use crate::envelope::{ApiJson, ApiPath, ApiQuery, ApiResponse};
use crate::error::{ApiError, ApiResult};
use crate::query::RangeParams;
use crate::routes::records::resource;
use crate::state::AppState;

const BASE: &str = "/api/task-scheduling";

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: TaskStatus,
}

async fn change_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<String>,
    ApiJson(req): ApiJson<StatusRequest>,
) -> ApiResult<ApiResponse<TaskStatusChange>> {
    if !req.status.is_builtin() {
        return Err(ApiError::bad_request(format!(
            "unknown task status {:?}; expected one of {}",
            req.status.as_str(),
            TaskStatus::BUILTIN.join(", ")
        )));
    }
    let change = state
        .blocking(move |s| {
            Ok(set_task_status(s.store(), &id, req.status, &s.record_ctx(actor.name()))?)
        })
        .await?;
    Ok(ApiResponse::ok(change))
}

async fn overdue(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<Task>>> {
    let tasks = state.blocking(|s| Ok(overdue_tasks(s.store(), today())?)).await?;
    Ok(ApiResponse::list(tasks))
}

async fn summary(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<RangeParams>,
) -> ApiResult<ApiResponse<TaskSummary>> {
    let summary = state
        .blocking(move |s| Ok(task_summary(s.store(), params.range(), today())?))
        .await?;
    Ok(ApiResponse::ok(summary))
}

pub fn routes() -> Router<AppState> {
    resource::<Task>(BASE)
        .route(&format!("{BASE}/{{id}}/status"), patch(change_status))
        .route(&format!("{BASE}/overdue"), get(overdue))
        .route(&format!("{BASE}/summary"), get(summary))
}
