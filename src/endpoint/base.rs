// Endpoint and middleware abstractions

use crate::core::context::RequestContext;
use crate::core::error::ServiceError;
use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// One business operation taking a typed request to a typed response.
///
/// Transports decode into `Req` and encode `Resp`; everything in between
/// (middleware, the operation itself) only sees typed values.
#[async_trait]
pub trait Endpoint<Req, Resp>: Send + Sync {
    async fn call(&self, ctx: RequestContext, request: Req) -> Result<Resp, ServiceError>;
}

pub type BoxEndpoint<Req, Resp> = Arc<dyn Endpoint<Req, Resp>>;

/// Endpoint backed by an async closure, see [`endpoint_fn`]
pub struct EndpointFn<F, Req, Resp> {
    f: F,
    _types: PhantomData<fn(Req) -> Resp>,
}

/// Turn `|ctx, request| async { ... }` into an endpoint
pub fn endpoint_fn<F, Fut, Req, Resp>(f: F) -> EndpointFn<F, Req, Resp>
where
    F: Fn(RequestContext, Req) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Resp, ServiceError>> + Send + 'static,
{
    EndpointFn {
        f,
        _types: PhantomData,
    }
}

#[async_trait]
impl<F, Fut, Req, Resp> Endpoint<Req, Resp> for EndpointFn<F, Req, Resp>
where
    F: Fn(RequestContext, Req) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Resp, ServiceError>> + Send + 'static,
    Req: Send + 'static,
    Resp: Send + 'static,
{
    async fn call(&self, ctx: RequestContext, request: Req) -> Result<Resp, ServiceError> {
        (self.f)(ctx, request).await
    }
}

/// Decorator producing a new endpoint from an existing one
pub trait Middleware<Req, Resp>: Send + Sync {
    fn wrap(&self, next: BoxEndpoint<Req, Resp>) -> BoxEndpoint<Req, Resp>;
}

/// Apply `middlewares` around `endpoint`; the first one listed runs first.
pub fn chain<Req, Resp>(
    endpoint: BoxEndpoint<Req, Resp>,
    middlewares: &[&dyn Middleware<Req, Resp>],
) -> BoxEndpoint<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    middlewares
        .iter()
        .rev()
        .fold(endpoint, |next, middleware| middleware.wrap(next))
}
