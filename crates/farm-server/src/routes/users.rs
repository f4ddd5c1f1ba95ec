//! `/api/users`

use axum::extract::State;
use axum::routing::{delete, get};
use axum::{Extension, Router};

use farm_core::enums::UserRole;
use farm_core::user::UserView;
use farm_storage::records::users::{delete_user, list_users, resolve_user};

use crate::auth::Actor;
use crate::envelope::{ApiPath, ApiResponse};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

async fn list(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<ApiResponse<Vec<UserView>>> {
    actor.require_role(&[UserRole::Admin, UserRole::Manager])?;
    let users = state.blocking(|s| Ok(list_users(s.store())?)).await?;
    Ok(ApiResponse::list(users.iter().map(|u| u.view()).collect()))
}

async fn remove(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<ApiResponse<UserView>> {
    actor.require_role(&[UserRole::Admin])?;
    let user = state
        .blocking(move |s| {
            let target = resolve_user(s.store(), &id)?;
            if actor.user().is_some_and(|me| me.id == target.id) {
                return Err(ApiError::bad_request("you cannot delete your own account"));
            }
            Ok(delete_user(s.store(), &target.id, actor.name())?)
        })
        .await?;
    Ok(ApiResponse::ok(user.view()))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list))
        .route("/api/users/{id}", delete(remove))
}
