// Centralized error handling for the user service

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failures raised by a user backend (database, RPC or in-memory)
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("user {0} not found")]
    NotFound(i64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("invalid backend response: {0}")]
    InvalidResponse(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Credential failures, raised by the transport or the auth middleware
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization token missing")]
    MissingToken,

    #[error("Invalid Authorization token format")]
    InvalidFormat,

    #[error("Invalid credentials")]
    InvalidCredentials { realm: String },
}

/// Error returned by every endpoint, middleware and decoder
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Decode(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Decode(_) => StatusCode::BAD_REQUEST,
            ServiceError::Auth(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = (status, self.to_string()).into_response();

        if let ServiceError::Auth(AuthError::InvalidCredentials { realm }) = &self {
            if let Ok(value) = HeaderValue::from_str(&format!("Basic realm=\"{}\"", realm)) {
                response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
            }
        }

        response
    }
}
