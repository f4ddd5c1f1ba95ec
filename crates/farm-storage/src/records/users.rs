//! User accounts.

use serde::Deserialize;
use tracing::info;

use farm_core::Document;
use farm_core::credentials::hash_password;
use farm_core::enums::UserRole;
use farm_core::filter::DocumentQuery;
use farm_core::user::User;
use farm_core::validation::{validate_password, validate_username};

use crate::error::{Result, StorageError};
use crate::traits::{DocumentAccess, Storage, Transaction, transact};
use crate::typed::Documents;

/// Input for [`create_user`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: UserRole,
    pub password: String,
}

fn normalise_username(username: &str) -> String {
    username.trim().to_lowercase()
}

pub fn find_user_by_username<A>(access: &A, username: &str) -> Result<Option<User>>
where
    A: DocumentAccess + ?Sized,
{
    let q = DocumentQuery::new().eq("username", normalise_username(username));
    Ok(access.find::<User>(&q)?.into_iter().next())
}

/// Looks a user up by id first, then by username.
pub fn resolve_user<A>(access: &A, id_or_username: &str) -> Result<User>
where
    A: DocumentAccess + ?Sized,
{
    match access.get::<User>(id_or_username) {
        Ok(user) => return Ok(user),
        Err(e) if !e.is_not_found() => return Err(e),
        Err(_) => {}
    }
    find_user_by_username(access, id_or_username)?
        .ok_or_else(|| StorageError::not_found(User::COLLECTION, id_or_username))
}

/// All users ordered by username.
pub fn list_users<A>(access: &A) -> Result<Vec<User>>
where
    A: DocumentAccess + ?Sized,
{
    let mut users = access.all::<User>()?;
    users.sort_by(|a, b| a.username.cmp(&b.username));
    Ok(users)
}

pub fn user_count<A>(access: &A) -> Result<usize>
where
    A: DocumentAccess + ?Sized,
{
    access.count::<User>(&DocumentQuery::new())
}

/// Normalises and validates `new` and hashes its password.
fn prepare_user(new: NewUser) -> Result<User> {
    let username = normalise_username(&new.username);
    validate_username(&username)?;
    validate_password(&new.password)?;

    let mut user = User::new(username, new.email.trim(), new.role);
    user.full_name = new.full_name.trim().to_owned();
    user.password_hash = hash_password(&new.password)?;
    Ok(user)
}

/// Inserts `user` unless its username is taken.
fn insert_unique(tx: &dyn Transaction, user: User, actor: &str) -> Result<User> {
    if find_user_by_username(tx, &user.username)?.is_some() {
        return Err(StorageError::duplicate(
            User::COLLECTION,
            "username",
            user.username,
        ));
    }
    tx.insert(user, actor)
}

/// Creates an account with a hashed password. Usernames are stored
/// lower-cased and must be unique.
pub fn create_user(store: &dyn Storage, new: NewUser, actor: &str) -> Result<User> {
    let user = prepare_user(new)?;
    let user = transact(store, |tx| insert_unique(tx, user.clone(), actor))?;
    info!(username = %user.username, role = %user.role, "created user");
    Ok(user)
}

/// Creates the farm's first account, always an admin. Returns `None`, and
/// stores nothing, once any account exists.
pub fn create_first_user(store: &dyn Storage, mut new: NewUser, actor: &str) -> Result<Option<User>> {
    if user_count(store)? > 0 {
        return Ok(None);
    }
    new.role = UserRole::Admin;
    let user = prepare_user(new)?;
    let created = transact(store, |tx| {
        if user_count(tx)? > 0 {
            return Ok(None);
        }
        insert_unique(tx, user.clone(), actor).map(Some)
    })?;
    if let Some(user) = &created {
        info!(username = %user.username, "created first admin");
    }
    Ok(created)
}

/// Loads a user exactly as exported, password hash included. The username
/// is normalised and must be unique.
pub fn import_user(tx: &dyn Transaction, mut user: User, actor: &str) -> Result<User> {
    user.username = normalise_username(&user.username);
    user.email = user.email.trim().to_owned();
    insert_unique(tx, user, actor)
}

/// Sets a new password and signs the user out everywhere.
pub fn change_password(
    store: &dyn Storage,
    id_or_username: &str,
    password: &str,
    actor: &str,
) -> Result<User> {
    validate_password(password)?;
    let password_hash = hash_password(password)?;
    let user = transact(store, |tx| {
        let mut user = resolve_user(tx, id_or_username)?;
        user.password_hash = password_hash.clone();
        let user = tx.replace(user, actor)?;
        tx.delete_user_sessions(&user.id)?;
        Ok(user)
    })?;
    info!(username = %user.username, "password changed");
    Ok(user)
}

/// Activates or deactivates an account. Deactivation ends its sessions.
pub fn set_active(
    store: &dyn Storage,
    id_or_username: &str,
    active: bool,
    actor: &str,
) -> Result<User> {
    let user = transact(store, |tx| {
        let mut user = resolve_user(tx, id_or_username)?;
        user.active = active;
        let user = tx.replace(user, actor)?;
        if !active {
            tx.delete_user_sessions(&user.id)?;
        }
        Ok(user)
    })?;
    info!(username = %user.username, active, "user active flag changed");
    Ok(user)
}

/// Removes an account and its sessions.
pub fn delete_user(store: &dyn Storage, id_or_username: &str, actor: &str) -> Result<User> {
    let user = transact(store, |tx| {
        let user = resolve_user(tx, id_or_username)?;
        let user = tx.delete::<User>(&user.id, actor)?;
        tx.delete_user_sessions(&user.id)?;
        Ok(user)
    })?;
    info!(username = %user.username, "deleted user");
    Ok(user)
}

#[cfg(test)]
pub(crate) fn new_user(username: &str, role: UserRole) -> NewUser {
    NewUser {
        username: username.to_owned(),
        email: format!("{username}@example.com"),
        full_name: String::new(),
        role,
        password: "correct-horse".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::testutil::store;
    use farm_core::credentials::verify_password;

    #[test]
    fn create_hashes_password_and_lowercases() {
        let s = store();
        let u = create_user(&s, new_user("  Amina ", UserRole::Manager), "admin").unwrap();
        assert_eq!(u.username, "amina");
        assert!(u.id.starts_with("usr-"));
        assert!(u.active);
        assert!(verify_password("correct-horse", &u.password_hash));
        assert_eq!(user_count(&s).unwrap(), 1);
    }

    #[test]
    fn duplicate_username_rejected() {
        let s = store();
        create_user(&s, new_user("joe", UserRole::Worker), "admin").unwrap();
        let err = create_user(&s, new_user("JOE", UserRole::Admin), "admin").unwrap_err();
        assert!(err.is_duplicate());
    }

    #[test]
    fn weak_password_and_bad_username_rejected() {
        let s = store();
        let mut short = new_user("kim", UserRole::Worker);
        short.password = "abc".into();
        assert!(create_user(&s, short, "admin").unwrap_err().is_validation());
        assert!(create_user(&s, new_user("a b", UserRole::Worker), "admin").unwrap_err().is_validation());
        assert_eq!(user_count(&s).unwrap(), 0);
    }

    #[test]
    fn resolve_by_id_or_name() {
        let s = store();
        let u = create_user(&s, new_user("otieno", UserRole::Worker), "admin").unwrap();
        assert_eq!(resolve_user(&s, &u.id).unwrap().username, "otieno");
        assert_eq!(resolve_user(&s, "Otieno").unwrap().id, u.id);
        assert!(resolve_user(&s, "nobody").unwrap_err().is_not_found());
    }

    #[test]
    fn change_password_replaces_hash() {
        let s = store();
        create_user(&s, new_user("wanjiru", UserRole::Worker), "admin").unwrap();
        let u = change_password(&s, "wanjiru", "new-password-1", "wanjiru").unwrap();
        assert!(verify_password("new-password-1", &u.password_hash));
        assert!(!verify_password("correct-horse", &u.password_hash));
        assert!(change_password(&s, "wanjiru", "short", "wanjiru").unwrap_err().is_validation());
    }

    #[test]
    fn list_is_sorted_and_delete_removes() {
        let s = store();
        for name in ["zed", "ann", "mo_1"] {
            create_user(&s, new_user(name, UserRole::Worker), "admin").unwrap();
        }
        let names: Vec<String> = list_users(&s).unwrap().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["ann", "mo_1", "zed"]);

        delete_user(&s, "zed", "admin").unwrap();
        assert_eq!(user_count(&s).unwrap(), 2);
        assert!(delete_user(&s, "zed", "admin").unwrap_err().is_not_found());
    }

    #[test]
    fn deactivate() {
        let s = store();
        create_user(&s, new_user("kip", UserRole::Worker), "admin").unwrap();
        let u = set_active(&s, "kip", false, "admin").unwrap();
        assert!(!u.active);
        assert!(!resolve_user(&s, "kip").unwrap().active);
    }

    #[test]
    fn delete_ends_sessions() {
        use crate::records::auth::{authenticate, login};
        use chrono::{Duration, Utc};

        let s = store();
        create_user(&s, new_user("kip", UserRole::Worker), "admin").unwrap();
        let out = login(&s, "kip", "correct-horse", Duration::hours(1)).unwrap();
        delete_user(&s, "kip", "admin").unwrap();
        assert!(authenticate(&s, &out.token, Utc::now()).unwrap_err().is_auth());
        assert!(s.get_session(&out.token).unwrap_err().is_not_found());
    }

    #[test]
    fn first_user_is_admin_and_only_once() {
        let s = store();
        let first = create_first_user(&s, new_user("amina", UserRole::Worker), "anonymous")
            .unwrap()
            .unwrap();
        assert_eq!(first.role, UserRole::Admin);

        let second = create_first_user(&s, new_user("otieno", UserRole::Worker), "anonymous").unwrap();
        assert!(second.is_none());
        assert_eq!(user_count(&s).unwrap(), 1);
    }

    #[test]
    fn import_keeps_hash_but_not_duplicates() {
        let s = store();
        let existing = create_user(&s, new_user("amina", UserRole::Admin), "admin").unwrap();

        let mut copy = existing.clone();
        copy.id = "usr-other".into();
        copy.username = " AMINA ".into();
        let err = transact(&s, |tx| import_user(tx, copy.clone(), "import")).unwrap_err();
        assert!(err.is_duplicate());

        let mut fresh = existing;
        fresh.id = "usr-fresh".into();
        fresh.username = "Baraka".into();
        let saved = transact(&s, |tx| import_user(tx, fresh.clone(), "import")).unwrap();
        assert_eq!(saved.username, "baraka");
        assert!(verify_password("correct-horse", &saved.password_hash));
    }
}
