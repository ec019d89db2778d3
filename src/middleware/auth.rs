// Basic authentication middleware

use crate::core::context::RequestContext;
use crate::core::error::{AuthError, ServiceError};
use crate::endpoint::base::{BoxEndpoint, Endpoint, Middleware};
use crate::utils::auth::verify_basic_token;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Rejects calls whose context token is not `base64(username:password)`
#[derive(Debug, Clone)]
pub struct BasicAuth {
    username: String,
    password: String,
    realm: String,
}

impl BasicAuth {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        realm: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            realm: realm.into(),
        }
    }

    fn check(&self, ctx: &RequestContext) -> Result<(), AuthError> {
        match ctx.credentials() {
            Some(token) if verify_basic_token(token, &self.username, &self.password) => Ok(()),
            _ => Err(AuthError::InvalidCredentials {
                realm: self.realm.clone(),
            }),
        }
    }
}

struct Authenticated<Req, Resp> {
    auth: BasicAuth,
    next: BoxEndpoint<Req, Resp>,
}

#[async_trait]
impl<Req, Resp> Endpoint<Req, Resp> for Authenticated<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    async fn call(&self, ctx: RequestContext, request: Req) -> Result<Resp, ServiceError> {
        if let Err(err) = self.auth.check(&ctx) {
            debug!(realm = %self.auth.realm, "Rejected credentials");
            return Err(err.into());
        }
        self.next.call(ctx, request).await
    }
}

impl<Req, Resp> Middleware<Req, Resp> for BasicAuth
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    fn wrap(&self, next: BoxEndpoint<Req, Resp>) -> BoxEndpoint<Req, Resp> {
        Arc::new(Authenticated {
            auth: self.clone(),
            next,
        })
    }
}
