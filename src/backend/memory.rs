// In-memory user backend

use crate::backend::service::UserBackend;
use crate::core::context::RequestContext;
use crate::core::error::BackendError;
use crate::models::user::User;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

/// In-process user store with the same semantics as the SQL backend.
///
/// Ids are handed out from 1 upwards and never reused.
pub struct MemoryBackend {
    users: DashMap<i64, User>,
    next_id: AtomicI64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserBackend for MemoryBackend {
    async fn create(&self, ctx: &RequestContext, user: User) -> Result<i64, BackendError> {
        ctx.run(async {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            self.users.insert(id, user.with_id(id));
            Ok(id)
        })
        .await
    }

    async fn get(&self, ctx: &RequestContext, id: i64) -> Result<User, BackendError> {
        ctx.run(async {
            self.users
                .get(&id)
                .map(|entry| entry.value().clone())
                .ok_or(BackendError::NotFound(id))
        })
        .await
    }

    async fn update(&self, ctx: &RequestContext, id: i64, user: User) -> Result<(), BackendError> {
        ctx.run(async {
            // Like `UPDATE ... WHERE id = ?`, a missing row is left alone
            if let Some(mut entry) = self.users.get_mut(&id) {
                *entry = user.with_id(id);
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, ctx: &RequestContext, id: i64) -> Result<(), BackendError> {
        ctx.run(async {
            self.users.remove(&id);
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let backend = MemoryBackend::new();
        let ctx = RequestContext::background();

        let first = backend.create(&ctx, User::new(0, "Alice", "a@x.com", "p")).await.unwrap();
        let second = backend.create(&ctx, User::new(99, "Bob", "b@x.com", "q")).await.unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(backend.len(), 2);

        // Caller-supplied ids are ignored on create
        assert!(matches!(backend.get(&ctx, 99).await, Err(BackendError::NotFound(99))));
    }

    #[tokio::test]
    async fn test_get_returns_stored_fields() {
        let backend = MemoryBackend::new();
        let ctx = RequestContext::background();

        let id = backend.create(&ctx, User::new(0, "Alice", "a@x.com", "p")).await.unwrap();
        let user = backend.get(&ctx, id).await.unwrap();

        assert_eq!(user, User::new(id, "Alice", "a@x.com", "p"));
    }

    #[tokio::test]
    async fn test_update_touches_only_target_row() {
        let backend = MemoryBackend::new();
        let ctx = RequestContext::background();

        let alice = backend.create(&ctx, User::new(0, "Alice", "a@x.com", "p")).await.unwrap();
        let bob = backend.create(&ctx, User::new(0, "Bob", "b@x.com", "q")).await.unwrap();

        backend
            .update(&ctx, alice, User::new(bob, "Alice2", "a@x.com", "p"))
            .await
            .unwrap();

        assert_eq!(backend.get(&ctx, alice).await.unwrap().name, "Alice2");
        assert_eq!(backend.get(&ctx, alice).await.unwrap().id, alice);
        assert_eq!(backend.get(&ctx, bob).await.unwrap().name, "Bob");
    }

    #[tokio::test]
    async fn test_update_missing_row_is_a_silent_success() {
        let backend = MemoryBackend::new();
        let ctx = RequestContext::background();

        backend
            .update(&ctx, 5, User::new(0, "Ghost", "g@x.com", "p"))
            .await
            .unwrap();

        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let backend = MemoryBackend::new();
        let ctx = RequestContext::background();

        let id = backend.create(&ctx, User::new(0, "Alice", "a@x.com", "p")).await.unwrap();
        backend.delete(&ctx, id).await.unwrap();
        backend.delete(&ctx, id).await.unwrap();

        assert!(matches!(backend.get(&ctx, id).await, Err(BackendError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_cancelled_context_does_not_write() {
        let backend = MemoryBackend::new();
        let ctx = RequestContext::background();
        ctx.cancel();

        let result = backend.create(&ctx, User::new(0, "Alice", "a@x.com", "p")).await;

        assert!(matches!(result, Err(BackendError::Cancelled)));
        assert!(backend.is_empty());
    }
}
