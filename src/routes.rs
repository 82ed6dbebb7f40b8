use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use http::{header, Method};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{handlers, middleware_layer, state::AppState};

/// Builds the `/v1` API.
///
/// Public: health, registration, login. Authenticated: single-user
/// operations and logout. Authenticated admins: the user listing.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/v1/", get(handlers::health::health_check))
        .route("/v1/user", post(handlers::users::create_user))
        .route("/v1/user/login", post(handlers::auth::login));

    let protected_routes = Router::new()
        .route(
            "/v1/user",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route("/v1/user/logout", post(handlers::auth::logout))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ));

    // Layers run outermost-last: authentication first, then the role check.
    let admin_routes = Router::new()
        .route("/v1/users", get(handlers::users::list_users))
        .route_layer(from_fn(middleware_layer::admin::require_admin))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(Duration::from_secs(86400));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(cors)
        .with_state(state)
}
