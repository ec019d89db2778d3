// User CRUD handlers

use crate::core::state::AppState;
use crate::transport::http::{
    decode_create_user_request, decode_delete_user_request, decode_get_user_request,
    decode_update_user_request, serve_endpoint,
};
use axum::{
    extract::{Request, State},
    response::Response,
};
use std::sync::Arc;

/// POST /api/users
pub async fn create_user_handler(State(state): State<Arc<AppState>>, request: Request) -> Response {
    serve_endpoint(
        &state.endpoints.create_user,
        decode_create_user_request,
        request,
        state.request_timeout,
    )
    .await
}

/// GET /api/users/{id}
pub async fn get_user_handler(State(state): State<Arc<AppState>>, request: Request) -> Response {
    serve_endpoint(
        &state.endpoints.get_user,
        decode_get_user_request,
        request,
        state.request_timeout,
    )
    .await
}

/// PUT /api/users/{id}
pub async fn update_user_handler(State(state): State<Arc<AppState>>, request: Request) -> Response {
    serve_endpoint(
        &state.endpoints.update_user,
        decode_update_user_request,
        request,
        state.request_timeout,
    )
    .await
}

/// DELETE /api/users/{id}
pub async fn delete_user_handler(State(state): State<Arc<AppState>>, request: Request) -> Response {
    serve_endpoint(
        &state.endpoints.delete_user,
        decode_delete_user_request,
        request,
        state.request_timeout,
    )
    .await
}
