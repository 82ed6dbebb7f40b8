use chrono::{DateTime, Utc};
use tokio_postgres::Row;

/// Represents a user in the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    /// The unique identifier for the user.
    pub id: i64,
    /// The user's full name.
    pub full_name: String,
    /// The user's phone number (unique).
    pub phone: String,
    /// The user's username (unique).
    pub user_name: String,
    /// The user's hashed password.
    pub password: String,
    /// The user's current session token, if logged in.
    pub login_token: Option<String>,
    /// Whether the user may access admin-only resources.
    pub admin: bool,
    /// The timestamp when the user was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl From<&Row> for User {
    fn from(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            full_name: row.get("full_name"),
            phone: row.get("phone"),
            user_name: row.get("user_name"),
            password: row.get("password"),
            login_token: row.get("login_token"),
            admin: row.get("admin"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

/// Fields needed to register a user. `password` is already hashed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateUserParams {
    pub full_name: String,
    pub phone: String,
    pub user_name: String,
    pub password: String,
}

/// A page of non-admin users.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListUsersParams {
    /// Zero-based page number.
    pub page_index: u32,
    /// Page size.
    pub offset: u32,
}

/// Full replacement of a user's mutable fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateUserParams {
    pub id: i64,
    pub full_name: String,
    pub phone: String,
    pub password: String,
    pub login_token: Option<String>,
}

impl UpdateUserParams {
    /// Copies every mutable field from `user`, to be selectively overridden.
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            phone: user.phone.clone(),
            password: user.password.clone(),
            login_token: user.login_token.clone(),
        }
    }
}
