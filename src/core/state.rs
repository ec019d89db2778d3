// Application state (AppState)

use crate::backend::service::SharedBackend;
use crate::core::config::Config;
use crate::endpoint::users::{make_endpoints, UserEndpoints};
use std::time::Duration;

/// Shared application state
///
/// Contains the middleware-wrapped endpoints the HTTP handlers dispatch to.
#[derive(Clone)]
pub struct AppState {
    /// User endpoints, already behind Basic authentication
    pub endpoints: UserEndpoints,

    /// Deadline given to every request's context
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(endpoints: UserEndpoints, request_timeout: Duration) -> Self {
        Self {
            endpoints,
            request_timeout,
        }
    }

    pub fn from_config(config: &Config, backend: SharedBackend) -> Self {
        Self::new(
            make_endpoints(backend, &config.auth),
            config.server.request_timeout(),
        )
    }
}
