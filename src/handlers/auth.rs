use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    middleware_layer::auth::Principal,
    services::auth as auth_service,
    state::AppState,
    validation::extract::ValidatedJson,
};

/// The request payload for user login.
#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[garde(length(min = 1))]
    pub user_name: String,
    #[garde(length(min = 1))]
    pub password: String,
}

/// The response payload for a successful login.
#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Handles user login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    tracing::info!("🔐 Login attempt for: {}", payload.user_name);

    let token = auth_service::login(&state, &payload.user_name, &payload.password).await?;

    Ok(Json(LoginResponse { token }))
}

/// Handles user logout.
#[axum::debug_handler]
pub async fn logout(State(state): State<AppState>, principal: Principal) -> Result<Response> {
    auth_service::logout(&state, &principal.user).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
