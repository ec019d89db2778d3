// Backend helpers for tests

use crate::backend::grpc::GrpcBackend;
use crate::backend::memory::MemoryBackend;
use crate::backend::service::UserBackend;
use crate::core::config::GrpcConfig;
use crate::core::context::RequestContext;
use crate::core::error::BackendError;
use crate::models::user::User;
use crate::rpc::server::make_user_service;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tonic::transport::server::TcpIncoming;

/// Serve a fresh in-memory store over gRPC on a local port and return a client for it
pub async fn spawn_grpc_server() -> GrpcBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let service = make_user_service(Arc::new(MemoryBackend::new()));

    tokio::spawn(async move {
        tonic::transport::Server::builder()
            .add_service(service)
            .serve_with_incoming(TcpIncoming::from(listener))
            .await
            .unwrap();
    });

    let config = GrpcConfig {
        endpoint: format!("http://{}", addr),
        ..GrpcConfig::default()
    };
    GrpcBackend::connect_lazy(&config).unwrap()
}

/// Counts every call reaching the store

#[derive(Default)]
pub struct CountingBackend {
    inner: MemoryBackend,
    calls: AtomicUsize,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserBackend for CountingBackend {
    async fn create(&self, ctx: &RequestContext, user: User) -> Result<i64, BackendError> {
        self.hit();
        self.inner.create(ctx, user).await
    }

    async fn get(&self, ctx: &RequestContext, id: i64) -> Result<User, BackendError> {
        self.hit();
        self.inner.get(ctx, id).await
    }

    async fn update(&self, ctx: &RequestContext, id: i64, user: User) -> Result<(), BackendError> {
        self.hit();
        self.inner.update(ctx, id, user).await
    }

    async fn delete(&self, ctx: &RequestContext, id: i64) -> Result<(), BackendError> {
        self.hit();
        self.inner.delete(ctx, id).await
    }
}

/// Backend whose every call takes `delay` to complete
pub struct SlowBackend {
    delay: Duration,
}

impl SlowBackend {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    async fn stall(&self, ctx: &RequestContext) -> Result<(), BackendError> {
        ctx.run(async {
            tokio::time::sleep(self.delay).await;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl UserBackend for SlowBackend {
    async fn create(&self, ctx: &RequestContext, _user: User) -> Result<i64, BackendError> {
        self.stall(ctx).await?;
        Ok(1)
    }

    async fn get(&self, ctx: &RequestContext, id: i64) -> Result<User, BackendError> {
        self.stall(ctx).await?;
        Ok(User::new(id, "Slow", "slow@x.com", "p"))
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        _id: i64,
        _user: User,
    ) -> Result<(), BackendError> {
        self.stall(ctx).await
    }

    async fn delete(&self, ctx: &RequestContext, _id: i64) -> Result<(), BackendError> {
        self.stall(ctx).await
    }
}
