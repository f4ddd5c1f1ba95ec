//! Login sessions.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use farm_core::credentials::{generate_session_token, reject_unknown_user, verify_password};
use farm_core::user::{Session, User, UserView};

use crate::error::{Result, StorageError};
use crate::records::users::find_user_by_username;
use crate::traits::Storage;
use crate::typed::Documents;

/// What a successful login hands back to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserView,
}

/// Verifies credentials of an active user and opens a session valid for
/// `ttl`. Unknown users, wrong passwords and inactive accounts all fail the
/// same way.
pub fn login(store: &dyn Storage, username: &str, password: &str, ttl: Duration) -> Result<LoginOutcome> {
    let Some(mut user) = find_user_by_username(store, username)? else {
        reject_unknown_user(password);
        warn!(username, "login for unknown user");
        return Err(StorageError::InvalidCredentials);
    };
    if !user.active || !verify_password(password, &user.password_hash) {
        warn!(username = %user.username, "login rejected");
        return Err(StorageError::InvalidCredentials);
    }

    let now = Utc::now();
    let expires_at = now
        .checked_add_signed(ttl)
        .ok_or_else(|| StorageError::validation(format!("session lifetime {ttl} is out of range")))?;
    user.last_login = Some(now);
    let user = store.replace(user, &user_actor(username))?;

    let session = Session {
        token: generate_session_token(),
        user_id: user.id.clone(),
        created_at: now,
        expires_at,
    };
    store.create_session(&session)?;
    info!(username = %user.username, expires_at = %session.expires_at, "login");

    Ok(LoginOutcome {
        token: session.token,
        expires_at: session.expires_at,
        user: user.view(),
    })
}

fn user_actor(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Resolves a bearer token to its active user. Expired sessions are
/// removed as they are found.
pub fn authenticate(store: &dyn Storage, token: &str, now: DateTime<Utc>) -> Result<User> {
    let session = match store.get_session(token) {
        Ok(s) => s,
        Err(e) if e.is_not_found() => return Err(StorageError::InvalidCredentials),
        Err(e) => return Err(e),
    };
    if session.is_expired(now) {
        debug!(user_id = %session.user_id, "session expired");
        store.delete_session(token)?;
        return Err(StorageError::SessionExpired);
    }
    match store.get::<User>(&session.user_id) {
        Ok(user) if user.active => Ok(user),
        Ok(_) => Err(StorageError::InvalidCredentials),
        Err(e) if e.is_not_found() => Err(StorageError::InvalidCredentials),
        Err(e) => Err(e),
    }
}

/// Ends a session. Unknown tokens are ignored.
pub fn logout(store: &dyn Storage, token: &str) -> Result<()> {
    store.delete_session(token)
}
