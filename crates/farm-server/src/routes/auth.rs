//! `/api/auth`

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Router};
use serde::Deserialize;
use tracing::info;

use farm_core::activity::ANONYMOUS_ACTOR;
use farm_core::enums::UserRole;
use farm_core::user::UserView;
use farm_storage::records::auth::{LoginOutcome, login, logout};
use farm_storage::records::users::{NewUser, create_first_user, create_user};

use crate::auth::{Actor, bearer_token, resolve_actor};
use crate::envelope::{ApiJson, ApiResponse, created};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

async fn sign_in(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<ApiResponse<LoginOutcome>> {
    let outcome = state
        .blocking(move |s| {
            Ok(login(s.store(), &req.username, &req.password, s.session_ttl())?)
        })
        .await?;
    Ok(ApiResponse::ok(outcome))
}

async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    if let Some(token) = bearer_token(&headers).map(str::to_owned) {
        state
            .blocking(move |s| Ok(logout(s.store(), &token)?))
            .await?;
    }
    Ok(ApiResponse::ok(serde_json::json!({ "loggedOut": true })))
}

async fn me(Extension(actor): Extension<Actor>) -> ApiResult<ApiResponse<UserView>> {
    match actor.user() {
        Some(user) => Ok(ApiResponse::ok(user.view())),
        None => Err(ApiError::unauthorized("not signed in")),
    }
}

/// Open while the farm has no accounts, so the first one can be made; that
/// account is always an admin. After that only admins may register users.
async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<NewUser>,
) -> ApiResult<impl IntoResponse> {
    let first = {
        let req = req.clone();
        state
            .blocking(move |s| Ok(create_first_user(s.store(), req, ANONYMOUS_ACTOR)?))
            .await?
    };
    let (user, by) = match first {
        Some(user) => (user, ANONYMOUS_ACTOR.to_owned()),
        None => {
            let Some(admin) = resolve_actor(&state, &headers).await? else {
                return Err(ApiError::unauthorized("missing bearer token"));
            };
            if admin.role != UserRole::Admin {
                return Err(ApiError::forbidden("only admins may register users"));
            }
            let by = admin.username;
            let actor = by.clone();
            let user = state
                .blocking(move |s| Ok(create_user(s.store(), req, &actor)?))
                .await?;
            (user, by)
        }
    };
    info!(username = %user.username, role = %user.role, by = %by, "registered user");
    Ok(created(user.view()))
}

/// Routes that work without a session.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(sign_in))
        .route("/api/auth/register", post(register))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/logout", post(sign_out))
        .route("/api/auth/me", get(me))
}
