use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Coarse classification of a [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    NotFound,
    BadInput,
    Other,
}

/// Errors raised by a user store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No live record matched.
    #[error("Could not find an {0} with the provided parameters")]
    NotFound(&'static str),

    /// The write conflicts with existing data (e.g. a unique column).
    #[error("{0}")]
    BadInput(String),

    /// A PostgreSQL error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection pool checkout error.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// A connection pool construction error.
    #[error("Pool creation error: {0}")]
    BuildPool(#[from] deadpool_postgres::BuildError),

    /// Anything else.
    #[error("Store error: {0}")]
    Other(String),
}

impl StoreError {
    /// Classifies the error.
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::NotFound(_) => StoreErrorKind::NotFound,
            StoreError::BadInput(_) => StoreErrorKind::BadInput,
            _ => StoreErrorKind::Other,
        }
    }
}

/// Generic message shared by every rejection on the resource-access path.
pub const UNAUTHORIZED_MESSAGE: &str = "User is not authorized to access this resource";
/// Message returned by the login endpoint when the password does not match.
pub const WRONG_PASSWORD_MESSAGE: &str = "Wrong password sent in request";
/// Message returned for forbidden resources.
pub const FORBIDDEN_MESSAGE: &str = "User is not allowed to access this resource";
/// Message returned for every internal failure.
pub const INTERNAL_MESSAGE: &str = "Unexpected server error. Try again later";
/// Message returned for malformed or invalid request parameters.
pub const BAD_REQUEST_MESSAGE: &str = "Incorrect parameters sent in request";

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request parameters failed to parse or validate.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A unique field is already taken.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Authentication failed on a guarded resource.
    #[error("Unauthorized")]
    Unauthorized,

    /// Credentials were submitted but the password did not match.
    #[error("Wrong password")]
    WrongPassword,

    /// Authenticated but not allowed.
    #[error("Forbidden")]
    Forbidden,

    /// The requested object does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err.kind() {
            StoreErrorKind::NotFound => AppError::NotFound(err.to_string()),
            StoreErrorKind::BadInput => AppError::AlreadyExists(err.to_string()),
            StoreErrorKind::Other => AppError::Internal(err.to_string()),
        }
    }
}

impl AppError {
    /// The HTTP status, the `name` and the `message` of the error body.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::BadRequest(_) => (
                StatusCode::BAD_REQUEST,
                "BadRequest",
                BAD_REQUEST_MESSAGE.to_string(),
            ),
            AppError::AlreadyExists(msg) => (StatusCode::BAD_REQUEST, "AlreadyExists", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                UNAUTHORIZED_MESSAGE.to_string(),
            ),
            AppError::WrongPassword => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                WRONG_PASSWORD_MESSAGE.to_string(),
            ),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden", FORBIDDEN_MESSAGE.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NotFound", msg.clone()),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                INTERNAL_MESSAGE.to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(ref detail) => tracing::debug!("Bad request: {}", detail),
            AppError::AlreadyExists(ref msg) => tracing::debug!("Already exists: {}", msg),
            AppError::Unauthorized => tracing::warn!("Request not authorized"),
            AppError::WrongPassword => tracing::warn!("Wrong password submitted"),
            AppError::Forbidden => tracing::warn!("Request forbidden"),
            AppError::NotFound(ref msg) => tracing::debug!("Not found: {}", msg),
            AppError::Internal(ref detail) => tracing::error!("Internal error: {}", detail),
        }

        let (status, name, message) = self.parts();

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "name": name,
            "message": message
        }))
        .unwrap_or_else(|_| {
            r#"{"name":"InternalServerError","message":"Unexpected server error. Try again later"}"#
                .to_string()
        });

        (
            status,
            [(http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}
