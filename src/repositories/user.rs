use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::error::SqlState;

use crate::{
    error::StoreError,
    models::user::{CreateUserParams, ListUsersParams, UpdateUserParams, User},
};

/// A `Result` type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistence for user records and their current session token.
///
/// Soft-deleted users are invisible to every operation.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new, non-admin user without a login token.
    async fn create_user(&self, params: CreateUserParams) -> StoreResult<User>;

    /// Looks a user up by username.
    async fn get_user(&self, user_name: &str) -> StoreResult<User>;

    /// Returns one page of non-admin users ordered by id.
    async fn list_users(&self, params: ListUsersParams) -> StoreResult<Vec<User>>;

    /// Replaces full name, phone, password and login token as a set.
    async fn update_user(&self, params: UpdateUserParams) -> StoreResult<()>;

    /// Soft-deletes a user by username.
    async fn delete_user(&self, user_name: &str) -> StoreResult<()>;

    /// Removes the stored login token, ending the user's session.
    async fn clear_login_token(&self, id: i64) -> StoreResult<()>;
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id          BIGSERIAL PRIMARY KEY,
    full_name   TEXT NOT NULL,
    phone       TEXT NOT NULL,
    user_name   TEXT NOT NULL,
    password    TEXT NOT NULL,
    login_token TEXT,
    admin       BOOLEAN NOT NULL DEFAULT FALSE,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at  TIMESTAMPTZ,
    CONSTRAINT users_phone_key UNIQUE (phone),
    CONSTRAINT users_user_name_key UNIQUE (user_name)
)
"#;

const USER_COLUMNS: &str =
    "id, full_name, phone, user_name, password, login_token, admin, created_at, updated_at";

/// Maps a unique-constraint violation to a `BadInput` naming the column.
fn map_write_error(err: tokio_postgres::Error) -> StoreError {
    if err.code() != Some(&SqlState::UNIQUE_VIOLATION) {
        return StoreError::Database(err);
    }

    let constraint = err
        .as_db_error()
        .and_then(|db| db.constraint().or(db.column()))
        .unwrap_or_default();

    let message = if constraint.contains("phone") {
        "An user with the provided phone number already exists"
    } else if constraint.contains("user_name") {
        "An user with the provided username already exists"
    } else {
        "An user with the provided information already exists"
    };

    StoreError::BadInput(message.to_string())
}

/// A [`UserStore`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgUserStore {
    pool: Pool,
}

impl PgUserStore {
    /// Creates a new `PgUserStore`.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Creates the `users` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        let client = self.pool.get().await?;
        client.batch_execute(SCHEMA).await?;
        tracing::info!("✅ users table ready");
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, params: CreateUserParams) -> StoreResult<User> {
        let client = self.pool.get().await?;
        let query = format!(
            "INSERT INTO users (full_name, phone, user_name, password, admin) \
             VALUES ($1, $2, $3, $4, FALSE) RETURNING {}",
            USER_COLUMNS
        );
        let row = client
            .query_one(
                query.as_str(),
                &[&params.full_name, &params.phone, &params.user_name, &params.password],
            )
            .await
            .map_err(map_write_error)?;

        let user = User::from(&row);
        tracing::info!("✅ User created with ID: {}", user.id);
        Ok(user)
    }

    async fn get_user(&self, user_name: &str) -> StoreResult<User> {
        let client = self.pool.get().await?;
        let query = format!(
            "SELECT {} FROM users WHERE user_name = $1 AND deleted_at IS NULL",
            USER_COLUMNS
        );
        let row = client
            .query_opt(query.as_str(), &[&user_name])
            .await?
            .ok_or(StoreError::NotFound("user"))?;
        Ok(User::from(&row))
    }

    async fn list_users(&self, params: ListUsersParams) -> StoreResult<Vec<User>> {
        let client = self.pool.get().await?;
        let limit = i64::from(params.offset);
        let skip = i64::from(params.page_index) * limit;
        let query = format!(
            "SELECT {} FROM users \
             WHERE deleted_at IS NULL AND admin = FALSE \
             ORDER BY id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        );
        let rows = client.query(query.as_str(), &[&limit, &skip]).await?;
        Ok(rows.iter().map(User::from).collect())
    }

    async fn update_user(&self, params: UpdateUserParams) -> StoreResult<()> {
        let client = self.pool.get().await?;
        let updated = client
            .execute(
                r#"
                UPDATE users
                SET full_name = $1, phone = $2, password = $3, login_token = $4, updated_at = NOW()
                WHERE id = $5 AND deleted_at IS NULL
                "#,
                &[
                    &params.full_name,
                    &params.phone,
                    &params.password,
                    &params.login_token,
                    &params.id,
                ],
            )
            .await
            .map_err(map_write_error)?;

        if updated == 0 {
            return Err(StoreError::NotFound("user"));
        }
        Ok(())
    }

    async fn delete_user(&self, user_name: &str) -> StoreResult<()> {
        let client = self.pool.get().await?;
        let deleted = client
            .execute(
                "UPDATE users SET deleted_at = NOW() WHERE user_name = $1 AND deleted_at IS NULL",
                &[&user_name],
            )
            .await?;

        if deleted == 0 {
            return Err(StoreError::NotFound("user"));
        }
        tracing::info!("🗑️ User soft-deleted: {}", user_name);
        Ok(())
    }

    async fn clear_login_token(&self, id: i64) -> StoreResult<()> {
        let client = self.pool.get().await?;
        let updated = client
            .execute(
                "UPDATE users SET login_token = NULL, updated_at = NOW() \
                 WHERE id = $1 AND deleted_at IS NULL",
                &[&id],
            )
            .await?;

        if updated == 0 {
            return Err(StoreError::NotFound("user"));
        }
        Ok(())
    }
}
