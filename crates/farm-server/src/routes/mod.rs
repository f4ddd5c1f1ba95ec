//! Route table.

pub mod auth;
pub mod eggs;
pub mod feed;
pub mod finance;
pub mod health;
pub mod records;
pub mod reports;
pub mod sales;
pub mod tasks;
pub mod users;

use axum::Router;
use axum::http::Uri;
use axum::middleware;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::error::ApiError;
use crate::state::AppState;

async fn no_route(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("no route for {}", uri.path()))
}

/// The full API. Everything outside `/health`, login and register sits
/// behind [`require_auth`].
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(auth::routes())
        .merge(eggs::routes())
        .merge(sales::routes())
        .merge(feed::routes())
        .merge(finance::routes())
        .merge(tasks::routes())
        .merge(reports::routes())
        .merge(users::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(health::routes())
        .merge(auth::public_routes())
        .merge(protected)
        .fallback(no_route)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
