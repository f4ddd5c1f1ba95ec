//! Bearer-token authentication.
//!
//! [`require_auth`] runs in front of every protected route and leaves an
//! [`Actor`] in the request extensions for handlers to pick up.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use tracing::debug;

use farm_core::activity::ANONYMOUS_ACTOR;
use farm_core::enums::UserRole;
use farm_core::user::User;
use farm_storage::records::auth::authenticate;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Who is making the request.
#[derive(Debug, Clone)]
pub enum Actor {
    User(User),
    /// Authentication is switched off and no valid token was sent.
    Anonymous,
}

impl Actor {
    /// Name recorded in the activity log.
    pub fn name(&self) -> &str {
        match self {
            Self::User(u) => &u.username,
            Self::Anonymous => ANONYMOUS_ACTOR,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Self::User(u) => Some(u),
            Self::Anonymous => None,
        }
    }

    fn role(&self) -> Option<&UserRole> {
        self.user().map(|u| &u.role)
    }

    /// Deleting records needs an admin or manager. With authentication
    /// off there are no roles to check.
    pub fn require_delete(&self) -> ApiResult<()> {
        match self.role() {
            Some(role) if !role.can_delete() => Err(ApiError::forbidden(
                "only admins and managers may delete records",
            )),
            _ => Ok(()),
        }
    }

    pub fn require_role(&self, allowed: &[UserRole]) -> ApiResult<()> {
        match self.role() {
            Some(role) if !allowed.contains(role) => Err(ApiError::forbidden(format!(
                "requires role {}",
                allowed
                    .iter()
                    .map(UserRole::as_str)
                    .collect::<Vec<_>>()
                    .join(" or ")
            ))),
            _ => Ok(()),
        }
    }
}

/// The token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Resolves the bearer token, if any, to an active user.
pub async fn resolve_actor(state: &AppState, headers: &HeaderMap) -> ApiResult<Option<User>> {
    let Some(token) = bearer_token(headers).map(str::to_owned) else {
        return Ok(None);
    };
    let user = state
        .blocking(move |s| Ok(authenticate(s.store(), &token, Utc::now())?))
        .await?;
    Ok(Some(user))
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let actor = if state.config.auth.required {
        match resolve_actor(&state, request.headers()).await? {
            Some(user) => Actor::User(user),
            None => return Err(ApiError::unauthorized("missing bearer token")),
        }
    } else {
        // A stale token is not worth failing over when nobody has to sign in.
        match resolve_actor(&state, request.headers()).await {
            Ok(Some(user)) => Actor::User(user),
            Ok(None) => Actor::Anonymous,
            Err(e) => {
                debug!(error = %e, "ignoring token");
                Actor::Anonymous
            }
        }
    };
    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn bearer_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc123")), Some("abc123"));
        assert_eq!(bearer_token(&headers("bearer  abc123 ")), Some("abc123"));
        assert_eq!(bearer_token(&headers("Basic abc123")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn roles() {
        let worker = Actor::User(User::new("wanjiru", "w@example.com", UserRole::Worker));
        let manager = Actor::User(User::new("otieno", "o@example.com", UserRole::Manager));

        assert!(worker.require_delete().is_err());
        assert!(manager.require_delete().is_ok());
        assert!(Actor::Anonymous.require_delete().is_ok());

        assert!(manager.require_role(&[UserRole::Admin]).is_err());
        assert!(manager
            .require_role(&[UserRole::Admin, UserRole::Manager])
            .is_ok());
        assert_eq!(worker.name(), "wanjiru");
        assert_eq!(Actor::Anonymous.name(), "anonymous");
    }
}
