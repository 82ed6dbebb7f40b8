#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use zeroize::Zeroizing;

use registry_api::{
    config::Config,
    repositories::{memory::MemoryUserStore, user::UserStore},
    routes::build_router,
    state::AppState,
    token::maker::SealedTokenMaker,
};

pub const TEST_KEY: [u8; 32] = *b"registry-test-key-32-bytes-long!";
pub const PASSWORD: &str = "secret1";

pub const UNAUTHORIZED_MESSAGE: &str = "User is not authorized to access this resource";

// Shared test context
pub struct TestContext {
    pub store: MemoryUserStore,
    pub app: Router,
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        database_max_connections: 1,
        server_address: "127.0.0.1:0".parse().unwrap(),
        token_symmetric_key: Zeroizing::new(TEST_KEY.to_vec()),
        access_token_duration: chrono::Duration::minutes(15),
    }
}

pub fn test_maker() -> SealedTokenMaker {
    SealedTokenMaker::new(&TEST_KEY).unwrap()
}

impl TestContext {
    pub fn new() -> Self {
        let store = MemoryUserStore::new();
        let app = app_with_store(Arc::new(store.clone()));
        Self { store, app }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        send(&self.app, request).await
    }

    pub async fn register(&self, user_name: &str, phone: &str) {
        let (status, _) = self
            .send(json_request(
                Method::POST,
                "/v1/user",
                None,
                json!({
                    "full_name": "Test User",
                    "phone": phone,
                    "user_name": user_name,
                    "password": PASSWORD,
                }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration of {} failed", user_name);
    }

    pub async fn login(&self, user_name: &str) -> String {
        let (status, body) = self
            .send(json_request(
                Method::POST,
                "/v1/user/login",
                None,
                json!({ "user_name": user_name, "password": PASSWORD }),
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "login of {} failed: {}", user_name, body);
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn register_admin(&self, user_name: &str, phone: &str) -> String {
        self.register(user_name, phone).await;
        self.store.set_admin(user_name, true).await.unwrap();
        self.login(user_name).await
    }
}

pub fn app_with_store(store: Arc<dyn UserStore>) -> Router {
    let state = AppState::with_parts(test_config(), store, Arc::new(test_maker()));
    build_router(state)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn assert_error(body: &Value, name: &str, message: &str) {
    assert_eq!(body["name"], name, "unexpected body: {}", body);
    assert_eq!(body["message"], message, "unexpected body: {}", body);
}
