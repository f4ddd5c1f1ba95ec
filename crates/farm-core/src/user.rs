//! User accounts and login sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{Document, document_plumbing};
use crate::enums::UserRole;
use crate::validation::{self, ValidationError};

fn default_active() -> bool {
    true
}

/// A stored user account, including its password hash.
///
/// Never hand this to a client directly; convert to [`UserView`] first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", default)]
    pub id: String,

    pub username: String,

    #[serde(default)]
    pub email: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub full_name: String,

    #[serde(default)]
    pub role: UserRole,

    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,

    /// Argon2id PHC string, see [`crate::credentials`].
    #[serde(default)]
    pub password_hash: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, email: impl Into<String>, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            username: username.into(),
            email: email.into(),
            full_name: String::new(),
            role,
            active: true,
            last_login: None,
            password_hash: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn view(&self) -> UserView {
        UserView::from(self)
    }
}

impl Document for User {
    const COLLECTION: &'static str = "users";
    const ID_PREFIX: &'static str = "usr";
    const DATE_FIELD: Option<&'static str> = None;

    document_plumbing!();

    fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_user(self)
    }

    fn label(&self) -> String {
        format!("{} ({})", self.username, self.role)
    }
}

/// Public projection of a [`User`] without credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub full_name: String,
    pub role: UserRole,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            username: u.username.clone(),
            email: u.email.clone(),
            full_name: u.full_name.clone(),
            role: u.role.clone(),
            active: u.active,
            last_login: u.last_login,
            created_at: u.created_at,
        }
    }
}

/// A bearer token bound to a user until `expires_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn view_hides_password_hash() {
        let mut u = User::new("amina", "amina@example.com", UserRole::Manager);
        u.password_hash = "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaA".into();
        let v = serde_json::to_value(u.view()).unwrap();
        assert!(v.get("passwordHash").is_none());
        assert_eq!(v["username"], "amina");
        assert_eq!(v["role"], "manager");
    }

    #[test]
    fn active_defaults_to_true() {
        let u: User = serde_json::from_str(r#"{"username":"joe"}"#).unwrap();
        assert!(u.active);
        assert_eq!(u.role, UserRole::Worker);
    }

    #[test]
    fn session_expiry_is_inclusive() {
        let now = Utc::now();
        let s = Session {
            token: "t".into(),
            user_id: "usr-1".into(),
            created_at: now - Duration::hours(1),
            expires_at: now,
        };
        assert!(s.is_expired(now));
        assert!(!s.is_expired(now - Duration::seconds(1)));
    }
}
