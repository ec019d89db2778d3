// Per-request execution context

use crate::core::error::BackendError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Carries the credential token, deadline and cancellation signal of one request.
///
/// Cloning is cheap; clones share the same cancellation token, so cancelling
/// any clone aborts work running under all of them.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    credentials: Option<String>,
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl RequestContext {
    /// Context with no credentials, no deadline and a fresh cancellation token
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_credentials(mut self, token: impl Into<String>) -> Self {
        self.credentials = Some(token.into());
        self
    }

    /// Set a deadline `timeout` from now. An earlier existing deadline is kept.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Set an absolute deadline. An earlier existing deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        });
        self
    }

    pub fn credentials(&self) -> Option<&str> {
        self.credentials.as_deref()
    }

    /// Time left before the deadline, `None` when there is no deadline
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Run `operation` until it completes, the context is cancelled, or the deadline passes.
    ///
    /// On cancellation or expiry the operation future is dropped, which aborts
    /// the in-flight query or call.
    pub async fn run<F, T>(&self, operation: F) -> Result<T, BackendError>
    where
        F: Future<Output = Result<T, BackendError>>,
    {
        if self.cancel.is_cancelled() {
            return Err(BackendError::Cancelled);
        }
        if matches!(self.remaining(), Some(left) if left.is_zero()) {
            return Err(BackendError::DeadlineExceeded);
        }

        let expiry = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(BackendError::Cancelled),
            _ = expiry => Err(BackendError::DeadlineExceeded),
            result = operation => result,
        }
    }
}
