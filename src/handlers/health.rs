use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: i64,
}

/// Liveness probe; never touches the backend and needs no credentials
///
/// GET /health
pub async fn health_handler() -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or_default();

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            timestamp,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_ok_with_timestamp() {
        use axum::body::Body;
        use http_body_util::BodyExt;

        let response = health_handler().await.into_response();

        let (parts, body) = response.into_parts();
        assert_eq!(parts.status, StatusCode::OK);

        assert_eq!(
            parts.headers.get("content-type").unwrap(),
            "application/json"
        );

        let body = Body::new(body);
        let bytes = body.collect().await.unwrap().to_bytes();
        let health: HealthResponse = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(health.status, "ok");
        assert!(health.timestamp > 0);
    }
}
