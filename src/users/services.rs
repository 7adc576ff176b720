//! User lifecycle orchestration. All storage access for user operations
//! goes through here and the repo; handlers only translate to HTTP.

use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::{CreateUserRequest, UpdateUserRequest};
use crate::users::repo::User;

pub async fn list_users(state: &AppState) -> Result<Vec<User>, ApiError> {
    Ok(User::list_active(&state.db).await?)
}

pub async fn get_user(state: &AppState, id: Uuid) -> Result<User, ApiError> {
    User::find_active_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound(id))
}

/// The duplicate check spans soft-deleted rows: a deleted user's email
/// cannot be reclaimed by a new registration.
pub async fn register(state: &AppState, input: CreateUserRequest) -> Result<User, ApiError> {
    if User::find_by_email_any_status(&state.db, &input.email)
        .await?
        .is_some()
    {
        warn!(email = %input.email, "email already registered");
        return Err(ApiError::DuplicateEmail);
    }

    let hash = hash_password(&input.password)?;
    let user = User::insert(&state.db, &input.name, &input.email, &hash, input.age).await?;
    info!(user_id = %user.id, "user created");
    Ok(user)
}

/// Unknown email and wrong password collapse into the same error.
pub async fn authenticate(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<User, ApiError> {
    let user = match User::find_active_by_email(&state.db, email).await? {
        Some(user) => user,
        None => {
            warn!("login with unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(password, &user.password_hash) {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    Ok(user)
}

pub async fn update_user(
    state: &AppState,
    id: Uuid,
    patch: UpdateUserRequest,
) -> Result<User, ApiError> {
    let current = User::find_active_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound(id))?;

    if let Some(email) = patch.email.as_deref() {
        if let Some(existing) = User::find_by_email_any_status(&state.db, email).await? {
            if existing.id != id {
                warn!(user_id = %id, "email already taken by another user");
                return Err(ApiError::DuplicateEmail);
            }
        }
    }

    let password_hash = match patch.password.as_deref() {
        Some(plain) => hash_password(plain)?,
        None => current.password_hash.clone(),
    };

    let next = resolve_update(&current, &patch, password_hash);
    let updated = User::update_row(
        &state.db,
        id,
        &next.name,
        &next.email,
        &next.password_hash,
        next.age,
        next.is_active,
    )
    .await?
    .ok_or(ApiError::NotFound(id))?;

    info!(user_id = %id, "user updated");
    Ok(updated)
}

/// Soft delete; the row stays addressable by id for toggling and purging.
pub async fn delete_user(state: &AppState, id: Uuid) -> Result<(), ApiError> {
    User::find_active_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound(id))?;
    User::set_active_flag(&state.db, id, false).await?;
    info!(user_id = %id, "user soft-deleted");
    Ok(())
}

/// Irreversible removal, regardless of the active flag.
pub async fn permanently_delete_user(state: &AppState, id: Uuid) -> Result<(), ApiError> {
    let deleted = User::hard_delete(&state.db, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(id));
    }
    info!(user_id = %id, "user permanently deleted");
    Ok(())
}

pub async fn search_users(state: &AppState, query: &str) -> Result<Vec<User>, ApiError> {
    if query.trim().is_empty() {
        return Err(ApiError::EmptyQuery);
    }
    Ok(User::search_active(&state.db, query).await?)
}

/// Flips `is_active` on any user found by id, bypassing the active-only
/// visibility used elsewhere.
pub async fn toggle_user_status(state: &AppState, id: Uuid) -> Result<User, ApiError> {
    let user = User::find_by_id_any_status(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound(id))?;
    let toggled = User::set_active_flag(&state.db, id, !user.is_active)
        .await?
        .ok_or(ApiError::NotFound(id))?;
    info!(user_id = %id, is_active = toggled.is_active, "user status toggled");
    Ok(toggled)
}

/// Resolved column values for a partial update; absent fields keep the
/// current row's values.
#[derive(Debug, PartialEq)]
struct ResolvedUpdate {
    name: String,
    email: String,
    password_hash: String,
    age: Option<i32>,
    is_active: bool,
}

fn resolve_update(current: &User, patch: &UpdateUserRequest, password_hash: String) -> ResolvedUpdate {
    ResolvedUpdate {
        name: patch.name.clone().unwrap_or_else(|| current.name.clone()),
        email: patch.email.clone().unwrap_or_else(|| current.email.clone()),
        password_hash,
        age: patch.age.or(current.age),
        is_active: patch.is_active.unwrap_or(current.is_active),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn existing_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ann Lee".into(),
            email: "ann@x.com".into(),
            password_hash: "old-hash".into(),
            age: Some(30),
            is_active: true,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn empty_patch() -> UpdateUserRequest {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }

    #[test]
    fn empty_patch_keeps_every_field() {
        let current = existing_user();
        let next = resolve_update(&current, &empty_patch(), current.password_hash.clone());
        assert_eq!(next.name, "Ann Lee");
        assert_eq!(next.email, "ann@x.com");
        assert_eq!(next.password_hash, "old-hash");
        assert_eq!(next.age, Some(30));
        assert!(next.is_active);
    }

    #[test]
    fn patch_changes_only_supplied_fields() {
        let current = existing_user();
        let patch: UpdateUserRequest = serde_json::from_value(serde_json::json!({
            "name": "Bea Wong",
            "age": 31
        }))
        .unwrap();
        let next = resolve_update(&current, &patch, current.password_hash.clone());
        assert_eq!(next.name, "Bea Wong");
        assert_eq!(next.age, Some(31));
        assert_eq!(next.email, "ann@x.com");
        assert_eq!(next.password_hash, "old-hash");
        assert!(next.is_active);
    }

    #[test]
    fn patch_can_flip_the_active_flag() {
        let current = existing_user();
        let patch: UpdateUserRequest =
            serde_json::from_value(serde_json::json!({"is_active": false})).unwrap();
        let next = resolve_update(&current, &patch, current.password_hash.clone());
        assert!(!next.is_active);
    }

    #[test]
    fn new_password_hash_replaces_the_stored_one() {
        let current = existing_user();
        let next = resolve_update(&current, &empty_patch(), "new-hash".into());
        assert_eq!(next.password_hash, "new-hash");
    }
}
