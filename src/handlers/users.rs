use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    middleware_layer::auth::Principal,
    models::user::User,
    services::users as user_service,
    state::AppState,
    validation::{
        extract::{ValidatedJson, ValidatedQuery},
        user::{is_phone, valid_password},
    },
};

/// The request payload for user registration.
#[derive(Deserialize, Validate)]
pub struct CreateUserRequest {
    #[garde(length(min = 1))]
    pub full_name: String,
    #[garde(custom(is_phone))]
    pub phone: String,
    #[garde(alphanumeric, length(min = 6))]
    pub user_name: String,
    #[garde(length(min = 6), custom(valid_password))]
    pub password: String,
}

/// Generic acknowledgement body.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Deserialize, Validate)]
pub struct GetUserQuery {
    #[garde(length(min = 1))]
    pub user_name: String,
}

/// Public view of a single user.
#[derive(Serialize)]
pub struct UserResponse {
    pub full_name: String,
    pub phone: String,
    pub user_name: String,
}

#[derive(Deserialize, Validate)]
pub struct ListUsersQuery {
    #[garde(skip)]
    #[serde(default)]
    pub page: u32,
    #[garde(skip)]
    #[serde(default)]
    pub offset: u32,
}

/// One entry of the user listing.
#[derive(Serialize)]
pub struct ListedUser {
    pub full_name: String,
    pub phone: String,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for ListedUser {
    fn from(user: User) -> Self {
        Self {
            full_name: user.full_name,
            phone: user.phone,
            user_name: user.user_name,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<ListedUser>,
}

/// The request payload for a profile update.
#[derive(Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[garde(length(min = 1))]
    pub full_name: String,
    #[garde(custom(is_phone))]
    pub phone: String,
}

#[derive(Deserialize, Validate)]
pub struct DeleteUserRequest {
    #[garde(length(min = 1))]
    pub user_name: String,
}

/// Handles user registration.
#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> Result<Response> {
    tracing::info!("📝 Register attempt: {}", payload.user_name);

    user_service::create_user(
        &state,
        payload.full_name,
        payload.phone,
        payload.user_name,
        &payload.password,
    )
    .await?;

    let response = MessageResponse {
        message: "User created successfully".to_string(),
    };

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Looks up a single user by username.
#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    _principal: Principal,
    ValidatedQuery(query): ValidatedQuery<GetUserQuery>,
) -> Result<Json<UserResponse>> {
    let user = state.store.get_user(&query.user_name).await?;

    Ok(Json(UserResponse {
        full_name: user.full_name,
        phone: user.phone,
        user_name: user.user_name,
    }))
}

/// Lists non-admin users page by page. Admin only.
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ListUsersQuery>,
) -> Result<Json<ListUsersResponse>> {
    let users = user_service::list_users(&state, query.page, query.offset).await?;

    Ok(Json(ListUsersResponse {
        users: users.into_iter().map(ListedUser::from).collect(),
    }))
}

/// Updates the caller's own full name and phone.
#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    principal: Principal,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> Result<Response> {
    user_service::update_profile(&state, &principal.user, payload.full_name, payload.phone).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Deletes a user. Admins may delete anyone, others only themselves.
#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    principal: Principal,
    ValidatedJson(payload): ValidatedJson<DeleteUserRequest>,
) -> Result<Response> {
    user_service::delete_user(&state, &principal.user, &payload.user_name).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
