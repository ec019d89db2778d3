// User endpoints: one per CRUD operation

use crate::backend::service::SharedBackend;
use crate::core::config::AuthConfig;
use crate::core::error::ServiceError;
use crate::endpoint::base::{chain, endpoint_fn, BoxEndpoint};
use crate::middleware::auth::BasicAuth;
use crate::models::dto::{
    CreateUserRequest, CreateUserResponse, DeleteUserRequest, DeleteUserResponse, GetUserRequest,
    GetUserResponse, UpdateUserRequest, UpdateUserResponse,
};
use crate::models::user::User;
use std::sync::Arc;

pub fn make_create_user_endpoint(
    backend: SharedBackend,
) -> BoxEndpoint<CreateUserRequest, CreateUserResponse> {
    Arc::new(endpoint_fn(move |ctx, request: CreateUserRequest| {
        let backend = backend.clone();
        async move {
            let id = backend.create(&ctx, User::from(request)).await?;
            Ok::<_, ServiceError>(CreateUserResponse { id })
        }
    }))
}

pub fn make_get_user_endpoint(
    backend: SharedBackend,
) -> BoxEndpoint<GetUserRequest, GetUserResponse> {
    Arc::new(endpoint_fn(move |ctx, request: GetUserRequest| {
        let backend = backend.clone();
        async move {
            let user = backend.get(&ctx, request.id).await?;
            Ok::<_, ServiceError>(GetUserResponse { user })
        }
    }))
}

pub fn make_update_user_endpoint(
    backend: SharedBackend,
) -> BoxEndpoint<UpdateUserRequest, UpdateUserResponse> {
    Arc::new(endpoint_fn(move |ctx, request: UpdateUserRequest| {
        let backend = backend.clone();
        async move {
            let id = request.id;
            backend.update(&ctx, id, User::from(request)).await?;
            Ok::<_, ServiceError>(UpdateUserResponse { success: true })
        }
    }))
}

pub fn make_delete_user_endpoint(
    backend: SharedBackend,
) -> BoxEndpoint<DeleteUserRequest, DeleteUserResponse> {
    Arc::new(endpoint_fn(move |ctx, request: DeleteUserRequest| {
        let backend = backend.clone();
        async move {
            backend.delete(&ctx, request.id).await?;
            Ok::<_, ServiceError>(DeleteUserResponse { success: true })
        }
    }))
}

/// The four user endpoints, each already wrapped in its middleware
#[derive(Clone)]
pub struct UserEndpoints {
    pub create_user: BoxEndpoint<CreateUserRequest, CreateUserResponse>,
    pub get_user: BoxEndpoint<GetUserRequest, GetUserResponse>,
    pub update_user: BoxEndpoint<UpdateUserRequest, UpdateUserResponse>,
    pub delete_user: BoxEndpoint<DeleteUserRequest, DeleteUserResponse>,
}

/// Build all endpoints over `backend`, each protected by Basic authentication
pub fn make_endpoints(backend: SharedBackend, auth: &AuthConfig) -> UserEndpoints {
    let basic = BasicAuth::new(&auth.username, &auth.password, &auth.realm);

    UserEndpoints {
        create_user: chain(make_create_user_endpoint(backend.clone()), &[&basic]),
        get_user: chain(make_get_user_endpoint(backend.clone()), &[&basic]),
        update_user: chain(make_update_user_endpoint(backend.clone()), &[&basic]),
        delete_user: chain(make_delete_user_endpoint(backend), &[&basic]),
    }
}
