use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder,
};
use zeroize::Zeroize;

use crate::error::{AppError, Result};
use crate::models::user::{UpdateUserParams, User};
use crate::state::AppState;

/// The memory cost for Argon2 in MB.
const ARGON2_MEMORY_MB: u32 = 19;
/// The number of iterations for Argon2.
const ARGON2_ITERATIONS: u32 = 3;
/// The parallelism factor for Argon2.
const ARGON2_PARALLELISM: u32 = 1;

/// Hashes a password using Argon2id.
///
/// # Arguments
///
/// * `password` - The password to hash.
///
/// # Returns
///
/// A `Result` containing the PHC-formatted hash.
pub fn hash_password(password: &str) -> Result<String> {
    let mut password_bytes = password.as_bytes().to_vec();
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        ParamsBuilder::new()
            .m_cost(ARGON2_MEMORY_MB * 1024)
            .t_cost(ARGON2_ITERATIONS)
            .p_cost(ARGON2_PARALLELISM)
            .build()
            .map_err(|e| AppError::Internal(format!("Argon2 params: {}", e)))?,
    );

    let password_hash = argon2
        .hash_password(&password_bytes, &salt)
        .map_err(|e| AppError::Internal(format!("Argon2 hash error: {}", e)))?
        .to_string();

    password_bytes.zeroize();
    tracing::debug!("Password hashed successfully with Argon2");
    Ok(password_hash)
}

/// Checks a supplied password against a stored hash.
///
/// A stored value that is not a valid PHC string never matches.
pub fn compare_password(stored: &str, supplied: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(stored) else {
        tracing::error!("❌ Stored password hash is malformed");
        return false;
    };

    let mut password_bytes = supplied.as_bytes().to_vec();
    let matches = Argon2::default()
        .verify_password(&password_bytes, &parsed_hash)
        .is_ok();
    password_bytes.zeroize();

    matches
}

/// Exchanges credentials for a fresh session token.
///
/// The new token replaces the user's stored login token, which invalidates
/// any token handed out earlier. It is only returned once that write has
/// succeeded.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `user_name` - The username submitted.
/// * `password` - The plaintext password submitted.
///
/// # Returns
///
/// The sealed token string.
pub async fn login(state: &AppState, user_name: &str, password: &str) -> Result<String> {
    tracing::debug!("🔐 Authenticating user: {}", user_name);

    let user: User = state.store.get_user(user_name).await?;

    if !compare_password(&user.password, password) {
        return Err(AppError::WrongPassword);
    }

    let (token, payload) = state
        .tokens
        .create_token(&user.user_name, state.config.access_token_duration)
        .map_err(|e| AppError::Internal(format!("Token issuance failed: {}", e)))?;

    let mut update = UpdateUserParams::from_user(&user);
    update.login_token = Some(token.clone());

    state
        .store
        .update_user(update)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to persist login token: {}", e)))?;

    tracing::info!(
        "✅ User logged in: {} (token {} expires {})",
        user.id,
        payload.id,
        payload.expired_at
    );

    Ok(token)
}

/// Ends the session of `user` by clearing the stored login token.
pub async fn logout(state: &AppState, user: &User) -> Result<()> {
    state
        .store
        .clear_login_token(user.id)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to clear login token: {}", e)))?;

    tracing::info!("👋 User logged out: {}", user.id);
    Ok(())
}
