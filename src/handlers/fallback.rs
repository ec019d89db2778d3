use axum::{http::StatusCode, response::IntoResponse};

/// Any route not registered in the router
pub async fn fallback_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}
