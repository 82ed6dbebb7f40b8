//! In-memory [`UserStore`] for development and testing.
//!
//! Mirrors the PostgreSQL store: unique user names and phones, soft deletion,
//! and admins hidden from listings.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    error::StoreError,
    models::user::{CreateUserParams, ListUsersParams, UpdateUserParams, User},
    repositories::user::{StoreResult, UserStore},
};

#[derive(Clone)]
struct Record {
    user: User,
    deleted_at: Option<DateTime<Utc>>,
}

impl Record {
    fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

#[derive(Default)]
struct Inner {
    records: Vec<Record>,
    next_id: i64,
}

/// A [`UserStore`] that keeps everything in process memory.
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryUserStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants or revokes the admin flag. There is no HTTP route for this.
    pub async fn set_admin(&self, user_name: &str, admin: bool) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let record = inner
            .records
            .iter_mut()
            .find(|r| r.is_live() && r.user.user_name == user_name)
            .ok_or(StoreError::NotFound("user"))?;
        record.user.admin = admin;
        record.user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, params: CreateUserParams) -> StoreResult<User> {
        let mut inner = self.inner.write().await;

        // Deleted rows keep their unique values, as the table constraints do.
        if inner.records.iter().any(|r| r.user.phone == params.phone) {
            return Err(StoreError::BadInput(
                "An user with the provided phone number already exists".to_string(),
            ));
        }
        if inner.records.iter().any(|r| r.user.user_name == params.user_name) {
            return Err(StoreError::BadInput(
                "An user with the provided username already exists".to_string(),
            ));
        }

        inner.next_id += 1;
        let now = Utc::now();
        let user = User {
            id: inner.next_id,
            full_name: params.full_name,
            phone: params.phone,
            user_name: params.user_name,
            password: params.password,
            login_token: None,
            admin: false,
            created_at: now,
            updated_at: now,
        };
        inner.records.push(Record {
            user: user.clone(),
            deleted_at: None,
        });

        tracing::debug!("User created in memory with ID: {}", user.id);
        Ok(user)
    }

    async fn get_user(&self, user_name: &str) -> StoreResult<User> {
        let inner = self.inner.read().await;
        inner
            .records
            .iter()
            .find(|r| r.is_live() && r.user.user_name == user_name)
            .map(|r| r.user.clone())
            .ok_or(StoreError::NotFound("user"))
    }

    async fn list_users(&self, params: ListUsersParams) -> StoreResult<Vec<User>> {
        let inner = self.inner.read().await;
        let skip = params.page_index as usize * params.offset as usize;
        Ok(inner
            .records
            .iter()
            .filter(|r| r.is_live() && !r.user.admin)
            .skip(skip)
            .take(params.offset as usize)
            .map(|r| r.user.clone())
            .collect())
    }

    async fn update_user(&self, params: UpdateUserParams) -> StoreResult<()> {
        let mut inner = self.inner.write().await;

        let index = inner
            .records
            .iter()
            .position(|r| r.is_live() && r.user.id == params.id)
            .ok_or(StoreError::NotFound("user"))?;

        if inner
            .records
            .iter()
            .any(|r| r.user.id != params.id && r.user.phone == params.phone)
        {
            return Err(StoreError::BadInput(
                "An user with the provided phone number already exists".to_string(),
            ));
        }

        let user = &mut inner.records[index].user;
        user.full_name = params.full_name;
        user.phone = params.phone;
        user.password = params.password;
        user.login_token = params.login_token;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_user(&self, user_name: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let record = inner
            .records
            .iter_mut()
            .find(|r| r.is_live() && r.user.user_name == user_name)
            .ok_or(StoreError::NotFound("user"))?;
        record.deleted_at = Some(Utc::now());
        Ok(())
    }

    async fn clear_login_token(&self, id: i64) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let record = inner
            .records
            .iter_mut()
            .find(|r| r.is_live() && r.user.id == id)
            .ok_or(StoreError::NotFound("user"))?;
        record.user.login_token = None;
        record.user.updated_at = Utc::now();
        Ok(())
    }
}
