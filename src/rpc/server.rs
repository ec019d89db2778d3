// gRPC server for the user.UserService API

use crate::backend::service::SharedBackend;
use crate::core::context::RequestContext;
use crate::core::error::BackendError;
use crate::models::user::User;
use crate::rpc::proto::{
    self,
    user_service_server::{UserService, UserServiceServer},
    UserId, UserRequest, UserResponse,
};
use tonic::{Request, Response, Status};
use tracing::{info, info_span, Instrument};

/// gRPC service that exposes a user backend.
///
/// Deadlines sent by clients are enforced by the tonic server itself; a call
/// abandoned by its client drops the backend future along with it.
pub struct UserRpcService {
    backend: SharedBackend,
}

impl UserRpcService {
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }
}

fn error_to_status(err: BackendError) -> Status {
    match err {
        BackendError::NotFound(_) => Status::not_found(err.to_string()),
        BackendError::Cancelled => Status::cancelled(err.to_string()),
        BackendError::DeadlineExceeded => Status::deadline_exceeded(err.to_string()),
        other => Status::internal(other.to_string()),
    }
}

#[tonic::async_trait]
impl UserService for UserRpcService {
    async fn create_user(
        &self,
        request: Request<UserRequest>,
    ) -> Result<Response<UserResponse>, Status> {
        let span = info_span!("rpc", otel.name = "CreateUser", otel.kind = "server");
        async {
            let user = User::from(request.into_inner());
            let ctx = RequestContext::background();

            let id = self
                .backend
                .create(&ctx, user.clone())
                .await
                .map_err(error_to_status)?;
            info!(user_id = id, "Created user");

            Ok::<_, Status>(Response::new(UserResponse::with_user(user.with_id(id))))
        }
        .instrument(span)
        .await
    }

    async fn get_user(&self, request: Request<UserId>) -> Result<Response<UserResponse>, Status> {
        let span = info_span!("rpc", otel.name = "GetUser", otel.kind = "server");
        async {
            let id = request.into_inner().id;
            let ctx = RequestContext::background();

            let user = self.backend.get(&ctx, id).await.map_err(error_to_status)?;
            info!(user_id = id, "Fetched user");

            Ok::<_, Status>(Response::new(UserResponse::with_user(user)))
        }
        .instrument(span)
        .await
    }

    async fn update_user(
        &self,
        request: Request<proto::User>,
    ) -> Result<Response<UserResponse>, Status> {
        let span = info_span!("rpc", otel.name = "UpdateUser", otel.kind = "server");
        async {
            let user = User::from(request.into_inner());
            let ctx = RequestContext::background();

            self.backend
                .update(&ctx, user.id, user.clone())
                .await
                .map_err(error_to_status)?;
            info!(user_id = user.id, "Updated user");

            // The updated record is echoed back
            Ok::<_, Status>(Response::new(UserResponse::with_user(user)))
        }
        .instrument(span)
        .await
    }

    async fn delete_user(
        &self,
        request: Request<UserId>,
    ) -> Result<Response<UserResponse>, Status> {
        let span = info_span!("rpc", otel.name = "DeleteUser", otel.kind = "server");
        async {
            let id = request.into_inner().id;
            let ctx = RequestContext::background();

            self.backend.delete(&ctx, id).await.map_err(error_to_status)?;
            info!(user_id = id, "Deleted user");

            Ok::<_, Status>(Response::new(UserResponse::empty()))
        }
        .instrument(span)
        .await
    }
}

/// Create a UserService server over the given backend
pub fn make_user_service(backend: SharedBackend) -> UserServiceServer<UserRpcService> {
    UserServiceServer::new(UserRpcService::new(backend))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryBackend;
    use std::sync::Arc;
    use tonic::Code;

    fn service() -> UserRpcService {
        UserRpcService::new(Arc::new(MemoryBackend::new()))
    }

    fn create_request(name: &str) -> Request<UserRequest> {
        Request::new(UserRequest {
            name: name.to_string(),
            email: format!("{}@x.com", name.to_lowercase()),
            password: "secret".to_string(),
        })
    }

    #[tokio::test]
    async fn test_create_returns_user_with_generated_id() {
        let svc = service();

        let response = svc.create_user(create_request("Alice")).await.unwrap();
        let user = response.into_inner().user.unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.name, "Alice");
        assert_eq!(user.email, "alice@x.com");
    }

    #[tokio::test]
    async fn test_get_missing_user_is_not_found() {
        let svc = service();

        let status = svc.get_user(Request::new(UserId { id: 9 })).await.unwrap_err();
        assert_eq!(status.code(), Code::NotFound);
    }

    #[tokio::test]
    async fn test_update_echoes_user() {
        let svc = service();
        svc.create_user(create_request("Alice")).await.unwrap();

        let updated = proto::User {
            id: 1,
            name: "Alice2".to_string(),
            email: "alice@x.com".to_string(),
            password: "secret".to_string(),
        };
        let response = svc.update_user(Request::new(updated.clone())).await.unwrap();
        assert_eq!(response.into_inner().user, Some(updated));

        let fetched = svc.get_user(Request::new(UserId { id: 1 })).await.unwrap();
        assert_eq!(fetched.into_inner().user.unwrap().name, "Alice2");
    }

    #[tokio::test]
    async fn test_delete_returns_empty_response() {
        let svc = service();
        svc.create_user(create_request("Alice")).await.unwrap();

        let response = svc.delete_user(Request::new(UserId { id: 1 })).await.unwrap();
        assert!(response.into_inner().user.is_none());

        let status = svc.get_user(Request::new(UserId { id: 1 })).await.unwrap_err();
        assert_eq!(status.code(), Code::NotFound);
    }

    #[test]
    fn test_error_to_status() {
        assert_eq!(error_to_status(BackendError::NotFound(1)).code(), Code::NotFound);
        assert_eq!(error_to_status(BackendError::Cancelled).code(), Code::Cancelled);
        assert_eq!(
            error_to_status(BackendError::DeadlineExceeded).code(),
            Code::DeadlineExceeded
        );
        assert_eq!(
            error_to_status(BackendError::Rpc("x".to_string())).code(),
            Code::Internal
        );
    }
}
