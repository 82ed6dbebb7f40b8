use axum::{body::Body, http::Request, middleware::Next, response::Response};

use crate::{
    error::AppError,
    middleware_layer::auth::{AuthError, Principal},
};

/// A middleware that lets only admins through.
///
/// Must be layered inside [`require_auth`](super::auth::require_auth); a
/// request without a principal is rejected as unauthorized.
pub async fn require_admin(
    principal: Principal,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if !principal.user.admin {
        tracing::warn!("❌ Admin access denied for user: {}", principal.user.id);
        return Err(AuthError::InsufficientRole.into());
    }

    tracing::debug!("✅ Admin access granted: {}", principal.user.id);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::StatusCode,
        middleware::from_fn,
        routing::get,
        Router,
    };
    use chrono::Utc;
    use tower::ServiceExt;

    use crate::models::user::User;

    fn principal(admin: bool) -> Principal {
        let now = Utc::now();
        Principal {
            token: "tok".to_string(),
            user: User {
                id: 1,
                full_name: "Test User".to_string(),
                phone: "99989992".to_string(),
                user_name: "testuser123".to_string(),
                password: "hash".to_string(),
                login_token: Some("tok".to_string()),
                admin,
                created_at: now,
                updated_at: now,
            },
        }
    }

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .route_layer(from_fn(require_admin))
    }

    async fn status_for(principal: Option<Principal>) -> StatusCode {
        let mut request = Request::builder().uri("/").body(Body::empty()).unwrap();
        if let Some(principal) = principal {
            request.extensions_mut().insert(principal);
        }
        app().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn admin_passes() {
        assert_eq!(status_for(Some(principal(true))).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn non_admin_is_forbidden() {
        assert_eq!(status_for(Some(principal(false))).await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn missing_principal_is_unauthorized() {
        assert_eq!(status_for(None).await, StatusCode::UNAUTHORIZED);
    }
}
