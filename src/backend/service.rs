// Data-access capability shared by every user backend

use crate::core::context::RequestContext;
use crate::core::error::BackendError;
use crate::models::user::User;
use async_trait::async_trait;
use std::sync::Arc;

/// CRUD operations over the user store.
///
/// Implementations must be safe to call concurrently from many requests and
/// must honour the context's cancellation and deadline.
#[async_trait]
pub trait UserBackend: Send + Sync {
    /// Insert `user` (its `id` is ignored) and return the generated id
    async fn create(&self, ctx: &RequestContext, user: User) -> Result<i64, BackendError>;

    /// Fetch one user; `BackendError::NotFound` when no row matches
    async fn get(&self, ctx: &RequestContext, id: i64) -> Result<User, BackendError>;

    /// Overwrite the user with the given id. Succeeds even when no row matched.
    async fn update(&self, ctx: &RequestContext, id: i64, user: User) -> Result<(), BackendError>;

    /// Delete the user with the given id. Succeeds even when no row matched.
    async fn delete(&self, ctx: &RequestContext, id: i64) -> Result<(), BackendError>;
}

pub type SharedBackend = Arc<dyn UserBackend>;
