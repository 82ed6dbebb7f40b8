use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::{
    error::{AppError, StoreError},
    models::user::User,
    state::AppState,
    token::maker::TokenError,
};

/// The only accepted authorization scheme.
pub const BEARER_SCHEME: &str = "Bearer";

/// Why a request was turned away by the auth or admin middleware.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("malformed authorization header")]
    InvalidRequestFormat,

    #[error("token is invalid")]
    InvalidToken,

    #[error("token has expired")]
    ExpiredToken,

    #[error("token is not the user's current session token")]
    SessionMismatch,

    #[error("failed to load principal: {0}")]
    PrincipalLoadFailure(#[source] StoreError),

    #[error("no authenticated principal on the request")]
    MissingPrincipal,

    #[error("principal lacks the admin role")]
    InsufficientRole,
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::ExpiredToken => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::PrincipalLoadFailure(e) => {
                AppError::Internal(format!("Failed to load principal: {}", e))
            }
            AuthError::InsufficientRole => AppError::Forbidden,
            _ => AppError::Unauthorized,
        }
    }
}

/// The authenticated caller, attached to the request by [`require_auth`].
#[derive(Clone, Debug)]
pub struct Principal {
    /// The bearer token that authenticated the request.
    pub token: String,
    /// The user the token belongs to, as loaded for this request.
    pub user: User,
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Principal>().cloned().ok_or_else(|| {
            tracing::warn!("❌ Principal not found in request extensions");
            AppError::from(AuthError::MissingPrincipal)
        })
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
///
/// The header must split on single spaces into exactly two parts, the first
/// being the literal scheme.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::InvalidRequestFormat)?
        .to_str()
        .map_err(|_| AuthError::InvalidRequestFormat)?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(BEARER_SCHEME), Some(token), None) => Ok(token),
        _ => Err(AuthError::InvalidRequestFormat),
    }
}

/// Runs the authentication checks for one request.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `headers` - The request headers.
///
/// # Returns
///
/// The `Principal` if the bearer token is authentic, unexpired and equal to
/// the user's stored login token.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Principal, AuthError> {
    let token = extract_bearer_token(headers)?;

    let payload = state.tokens.verify_token(token)?;

    // A user that vanished after the token was issued ends up here as well.
    let user = state
        .store
        .get_user(&payload.username)
        .await
        .map_err(AuthError::PrincipalLoadFailure)?;

    let matches = user
        .login_token
        .as_deref()
        .map(|stored| bool::from(stored.as_bytes().ct_eq(token.as_bytes())))
        .unwrap_or(false);

    if !matches {
        return Err(AuthError::SessionMismatch);
    }

    Ok(Principal {
        token: token.to_string(),
        user,
    })
}

/// A middleware that requires a valid bearer token.
///
/// Every rejection other than a failed principal lookup yields the same
/// generic 401 body.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    tracing::debug!("🔐 Checking authentication...");

    let principal = authenticate(&state, request.headers()).await.map_err(|e| {
        match &e {
            AuthError::PrincipalLoadFailure(_) => tracing::error!("❌ Authentication failed: {}", e),
            _ => tracing::warn!("❌ Authentication failed: {}", e),
        }
        AppError::from(e)
    })?;

    tracing::debug!("✅ User authenticated: {}", principal.user.id);

    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        let headers = headers("Bearer abc.def");
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def");
    }

    #[test]
    fn malformed_headers_are_rejected() {
        assert!(matches!(
            extract_bearer_token(&HeaderMap::new()),
            Err(AuthError::InvalidRequestFormat)
        ));

        for value in ["Basic xyz", "bearer abc", "Bearer", "Bearer a b", "Bearerabc", "Bearer  abc"] {
            assert!(
                matches!(
                    extract_bearer_token(&headers(value)),
                    Err(AuthError::InvalidRequestFormat)
                ),
                "accepted {:?}",
                value
            );
        }
    }

    #[test]
    fn auth_errors_map_to_statuses() {
        use axum::http::StatusCode;
        use axum::response::IntoResponse;

        let unauthorized = [
            AuthError::InvalidRequestFormat,
            AuthError::InvalidToken,
            AuthError::ExpiredToken,
            AuthError::SessionMismatch,
            AuthError::MissingPrincipal,
        ];
        for err in unauthorized {
            assert_eq!(AppError::from(err).into_response().status(), StatusCode::UNAUTHORIZED);
        }

        assert_eq!(
            AppError::from(AuthError::InsufficientRole).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(AuthError::PrincipalLoadFailure(StoreError::NotFound("user")))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn token_errors_keep_expiry_distinct() {
        assert!(matches!(AuthError::from(TokenError::ExpiredToken), AuthError::ExpiredToken));
        assert!(matches!(AuthError::from(TokenError::InvalidToken), AuthError::InvalidToken));
    }
}
