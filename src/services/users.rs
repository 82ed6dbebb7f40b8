use crate::error::{AppError, Result};
use crate::models::user::{CreateUserParams, ListUsersParams, UpdateUserParams, User};
use crate::services::auth::hash_password;
use crate::state::AppState;

/// Page size used when the caller does not ask for one.
pub const MIN_OFFSET: u32 = 5;

/// Registers a new user, hashing the password before it is stored.
pub async fn create_user(
    state: &AppState,
    full_name: String,
    phone: String,
    user_name: String,
    password: &str,
) -> Result<User> {
    tracing::debug!("📝 Creating user: {}", user_name);
    let password = hash_password(password)?;

    let user = state
        .store
        .create_user(CreateUserParams {
            full_name,
            phone,
            user_name,
            password,
        })
        .await?;

    tracing::info!("✅ User registered: {}", user.id);
    Ok(user)
}

/// Returns a page of non-admin users. An `offset` of zero falls back to
/// [`MIN_OFFSET`].
pub async fn list_users(state: &AppState, page_index: u32, offset: u32) -> Result<Vec<User>> {
    let offset = if offset == 0 { MIN_OFFSET } else { offset };

    state
        .store
        .list_users(ListUsersParams { page_index, offset })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Changes the caller's full name and phone, keeping password and session.
pub async fn update_profile(
    state: &AppState,
    current: &User,
    full_name: String,
    phone: String,
) -> Result<()> {
    let mut update = UpdateUserParams::from_user(current);
    update.full_name = full_name;
    update.phone = phone;

    state.store.update_user(update).await?;
    tracing::info!("✅ Profile updated for user: {}", current.id);
    Ok(())
}

/// Deletes `target`. Admins may delete anyone, other users only themselves.
pub async fn delete_user(state: &AppState, current: &User, target: &str) -> Result<()> {
    if !current.admin && current.user_name != target {
        tracing::warn!(
            "❌ User {} tried to delete another user: {}",
            current.user_name,
            target
        );
        return Err(AppError::Forbidden);
    }

    state.store.delete_user(target).await?;
    tracing::info!("🗑️ User deleted: {} (by {})", target, current.user_name);
    Ok(())
}
