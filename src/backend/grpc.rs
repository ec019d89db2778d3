// Remote user backend speaking to a `user.UserService` gRPC server

use crate::backend::service::UserBackend;
use crate::core::config::GrpcConfig;
use crate::core::context::RequestContext;
use crate::core::error::BackendError;
use crate::models::user::User;
use crate::rpc::proto::{self, user_service_client::UserServiceClient};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Status};
use tracing::debug;

/// Client-side backend. The channel connects lazily, so building one never
/// blocks on the remote server being up.
#[derive(Debug, Clone)]
pub struct GrpcBackend {
    client: UserServiceClient<Channel>,
}

impl GrpcBackend {
    pub fn connect_lazy(config: &GrpcConfig) -> Result<Self> {
        let channel = Endpoint::from_shared(config.endpoint.clone())
            .with_context(|| format!("Invalid gRPC endpoint: {}", config.endpoint))?
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .connect_lazy();

        Ok(Self::from_channel(channel))
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self {
            client: UserServiceClient::new(channel),
        }
    }
}

/// Wrap a message, propagating whatever time the context has left
fn request<T>(ctx: &RequestContext, message: T) -> tonic::Request<T> {
    let mut request = tonic::Request::new(message);
    if let Some(remaining) = ctx.remaining() {
        request.set_timeout(remaining);
    }
    request
}

fn status_to_error(status: Status, id: Option<i64>) -> BackendError {
    match (status.code(), id) {
        (Code::NotFound, Some(id)) => BackendError::NotFound(id),
        (Code::Cancelled, _) => BackendError::Cancelled,
        (Code::DeadlineExceeded, _) => BackendError::DeadlineExceeded,
        _ => BackendError::Rpc(status.message().to_string()),
    }
}

fn expect_user(response: proto::UserResponse, method: &str) -> Result<proto::User, BackendError> {
    response
        .user
        .ok_or_else(|| BackendError::InvalidResponse(format!("{} returned no user", method)))
}

#[async_trait]
impl UserBackend for GrpcBackend {
    async fn create(&self, ctx: &RequestContext, user: User) -> Result<i64, BackendError> {
        let mut client = self.client.clone();
        ctx.run(async move {
            let response = client
                .create_user(request(ctx, proto::UserRequest::from(user)))
                .await
                .map_err(|status| status_to_error(status, None))?;
            let created = expect_user(response.into_inner(), "CreateUser")?;
            debug!(user_id = created.id, "Remote create succeeded");
            Ok::<_, BackendError>(created.id)
        })
        .await
    }

    async fn get(&self, ctx: &RequestContext, id: i64) -> Result<User, BackendError> {
        let mut client = self.client.clone();
        ctx.run(async move {
            let response = client
                .get_user(request(ctx, proto::UserId { id }))
                .await
                .map_err(|status| status_to_error(status, Some(id)))?;
            let user = expect_user(response.into_inner(), "GetUser")?;
            Ok::<_, BackendError>(User::from(user))
        })
        .await
    }

    async fn update(&self, ctx: &RequestContext, id: i64, user: User) -> Result<(), BackendError> {
        let mut client = self.client.clone();
        ctx.run(async move {
            client
                .update_user(request(ctx, proto::User::from(user.with_id(id))))
                .await
                .map_err(|status| status_to_error(status, Some(id)))?;
            Ok::<_, BackendError>(())
        })
        .await
    }

    async fn delete(&self, ctx: &RequestContext, id: i64) -> Result<(), BackendError> {
        let mut client = self.client.clone();
        ctx.run(async move {
            client
                .delete_user(request(ctx, proto::UserId { id }))
                .await
                .map_err(|status| status_to_error(status, Some(id)))?;
            Ok::<_, BackendError>(())
        })
        .await
    }
}
