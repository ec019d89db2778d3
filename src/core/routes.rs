// HTTP routes configuration

use crate::core::state::AppState;
use crate::handlers::{fallback, health, users};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Public endpoints
        .route("/health", get(health::health_handler))

        // User endpoints (require Basic credentials)
        .route("/api/users", post(users::create_user_handler))
        .route(
            "/api/users/{id}",
            get(users::get_user_handler)
                .put(users::update_user_handler)
                .delete(users::delete_user_handler),
        )

        // 404 fallback for all unmatched routes
        .fallback(fallback::fallback_handler)

        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryBackend;
    use crate::backend::service::SharedBackend;
    use crate::backend::testing::{spawn_grpc_server, CountingBackend, SlowBackend};
    use crate::core::config::AuthConfig;
    use crate::endpoint::users::make_endpoints;
    use crate::utils::auth::encode_basic_token;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    fn app_with_timeout(backend: SharedBackend, timeout: Duration) -> Router {
        let auth = AuthConfig {
            username: "IOT".to_string(),
            password: "1".to_string(),
            realm: "ProtectedArea".to_string(),
        };
        let state = AppState::new(make_endpoints(backend, &auth), timeout);
        build_router(Arc::new(state))
    }

    fn app(backend: SharedBackend) -> Router {
        app_with_timeout(backend, Duration::from_secs(5))
    }

    fn request(
        method: Method,
        uri: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    fn basic() -> String {
        format!("Basic {}", encode_basic_token("IOT", "1"))
    }

    /// Request carrying valid credentials
    fn authed(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
        request(method, uri, Some(&basic()), body)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn json_of(body: &str) -> Value {
        serde_json::from_str(body).unwrap()
    }

    /// Create, read, update, delete, then read the deleted user back
    async fn crud_scenario(app: &Router) {
        let alice = json!({"name": "Alice", "email": "a@x.com", "password": "p"});

        let (status, body) = send(app, authed(Method::POST, "/api/users", Some(alice))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body), json!({"id": 1}));

        let (status, body) = send(app, authed(Method::GET, "/api/users/1", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json_of(&body),
            json!({"user": {"id": 1, "name": "Alice", "email": "a@x.com", "password": "p"}})
        );

        let update = json!({"name": "Alice2", "email": "a@x.com", "password": "p"});
        let (status, body) = send(app, authed(Method::PUT, "/api/users/1", Some(update))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body), json!({"success": true}));

        let (_, body) = send(app, authed(Method::GET, "/api/users/1", None)).await;
        assert_eq!(json_of(&body)["user"]["name"], "Alice2");

        let (status, body) = send(app, authed(Method::DELETE, "/api/users/1", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body), json!({"success": true}));

        let (status, body) = send(app, authed(Method::GET, "/api/users/1", None)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "user 1 not found");
    }

    #[tokio::test]
    async fn test_crud_scenario() {
        let app = app(Arc::new(MemoryBackend::new()));
        crud_scenario(&app).await;
    }

    #[tokio::test]
    async fn test_crud_scenario_over_grpc_backend() {
        let app = app(Arc::new(spawn_grpc_server().await));
        crud_scenario(&app).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_timeout_is_enforced() {
        let backend = Arc::new(SlowBackend::new(Duration::from_secs(10)));
        let app = app_with_timeout(backend, Duration::from_millis(100));

        let (status, body) = send(&app, authed(Method::GET, "/api/users/1", None)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "deadline exceeded");
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_within_timeout_succeeds() {
        let backend = Arc::new(SlowBackend::new(Duration::from_millis(50)));
        let app = app_with_timeout(backend, Duration::from_millis(100));

        let (status, body) = send(&app, authed(Method::GET, "/api/users/1", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body)["user"]["id"], 1);
    }

    #[tokio::test]
    async fn test_success_is_json() {
        let app = app(Arc::new(MemoryBackend::new()));
        let alice = json!({"name": "Alice", "email": "a@x.com", "password": "p"});

        let response = app
            .oneshot(authed(Method::POST, "/api/users", Some(alice)))
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_update_uses_path_id_over_body_id() {
        let app = app(Arc::new(MemoryBackend::new()));

        for name in ["Alice", "Bob"] {
            let body = json!({"name": name, "email": "x@x.com", "password": "p"});
            send(&app, authed(Method::POST, "/api/users", Some(body))).await;
        }

        let update = json!({"id": 2, "name": "Alice2", "email": "x@x.com", "password": "p"});
        let (status, _) = send(&app, authed(Method::PUT, "/api/users/1", Some(update))).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, authed(Method::GET, "/api/users/2", None)).await;
        assert_eq!(json_of(&body)["user"]["name"], "Bob");
        let (_, body) = send(&app, authed(Method::GET, "/api/users/1", None)).await;
        assert_eq!(json_of(&body)["user"]["name"], "Alice2");
    }

    fn all_operations() -> Vec<(Method, &'static str, Option<Value>)> {
        let user = json!({"name": "Alice", "email": "a@x.com", "password": "p"});
        vec![
            (Method::POST, "/api/users", Some(user.clone())),
            (Method::GET, "/api/users/1", None),
            (Method::PUT, "/api/users/1", Some(user)),
            (Method::DELETE, "/api/users/1", None),
        ]
    }

    #[tokio::test]
    async fn test_missing_header_is_rejected_for_every_operation() {
        let backend = Arc::new(CountingBackend::new());
        let app = app(backend.clone());

        for (method, uri, body) in all_operations() {
            let (status, text) = send(&app, request(method, uri, None, body)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(text, "Authorization token missing");
        }
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_header_is_rejected_for_every_operation() {
        let backend = Arc::new(CountingBackend::new());
        let app = app(backend.clone());

        for header_value in ["Bearer abc", "Basic", "Basic a b"] {
            for (method, uri, body) in all_operations() {
                let (status, text) =
                    send(&app, request(method, uri, Some(header_value), body)).await;
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(text, "Invalid Authorization token format");
            }
        }
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_header_is_checked_before_decoding() {
        let backend = Arc::new(CountingBackend::new());
        let app = app(backend.clone());

        let (status, _) = send(&app, request(Method::GET, "/api/users/abc", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_wrong_credentials_get_challenge() {
        let backend = Arc::new(CountingBackend::new());
        let app = app(backend.clone());
        let wrong = format!("Basic {}", encode_basic_token("IOT", "2"));

        for (method, uri, body) in all_operations() {
            let response = app
                .clone()
                .oneshot(request(method, uri, Some(&wrong), body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(
                response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
                "Basic realm=\"ProtectedArea\""
            );
        }
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_bad_input_is_400_without_backend_call() {
        let backend = Arc::new(CountingBackend::new());
        let app = app(backend.clone());
        let auth = basic();

        let (status, _) = send(&app, authed(Method::GET, "/api/users/abc", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, authed(Method::DELETE, "/api/users/1.5", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let malformed = Request::builder()
            .method(Method::POST)
            .uri("/api/users")
            .header(header::AUTHORIZATION, &auth)
            .body(Body::from("{\"name\":"))
            .unwrap();
        let (status, _) = send(&app, malformed).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let malformed = Request::builder()
            .method(Method::PUT)
            .uri("/api/users/1")
            .header(header::AUTHORIZATION, &auth)
            .body(Body::from("{not json"))
            .unwrap();
        let (status, _) = send(&app, malformed).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = app(Arc::new(CountingBackend::new()));
        let (status, body) = send(&app, request(Method::GET, "/health", None, None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body)["status"], "ok");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = app(Arc::new(CountingBackend::new()));
        let (status, body) = send(&app, authed(Method::GET, "/nope", None)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Not Found");
    }
}
