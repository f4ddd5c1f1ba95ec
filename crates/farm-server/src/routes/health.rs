use axum::Router;
use axum::extract::State;
use axum::routing::get;
use serde::Serialize;
use tracing::warn;

use farm_core::Document;
use farm_core::filter::DocumentQuery;
use farm_core::user::User;
use farm_storage::DocumentAccess;

use crate::envelope::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub database: bool,
}

/// Liveness plus a cheap query to show the database answers.
async fn health(State(state): State<AppState>) -> ApiResponse<Health> {
    let counted = state
        .blocking(|s| {
            Ok(s.store()
                .count_documents(User::COLLECTION, &DocumentQuery::new())?)
        })
        .await;
    let database = match counted {
        Ok(_) => true,
        Err(e) => {
            warn!(error = %e, "health check query failed");
            false
        }
    };
    ApiResponse::ok(Health {
        status: if database { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
