// HTTP transport: decode requests, run endpoints, encode responses

use crate::core::context::RequestContext;
use crate::core::error::{AuthError, ServiceError};
use crate::endpoint::base::BoxEndpoint;
use crate::models::dto::{
    CreateUserRequest, DeleteUserRequest, GetUserRequest, UpdateUserRequest,
};
use crate::utils::auth::parse_basic_header;
use axum::{
    extract::{Path, Request},
    http::{header, request::Parts, HeaderMap},
    response::{IntoResponse, Response},
    Json, RequestPartsExt,
};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, field, info_span, warn, Instrument, Span};

/// Largest JSON body accepted by the decoders
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Where a request is in its lifecycle. A failure is tagged with the last
/// stage that completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    AuthHeaderChecked,
    Decoded,
    Authorized,
    Processed,
    Encoded,
    Sent,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::AuthHeaderChecked => "auth_header_checked",
            Stage::Decoded => "decoded",
            Stage::Authorized => "authorized",
            Stage::Processed => "processed",
            Stage::Encoded => "encoded",
            Stage::Sent => "sent",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pull the Basic token out of the `Authorization` header
pub fn authorization_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;
    let value = value.to_str().map_err(|_| AuthError::InvalidFormat)?;
    if value.is_empty() {
        return Err(AuthError::MissingToken);
    }
    parse_basic_header(value).map(str::to_string)
}

async fn path_id(parts: &mut Parts) -> Result<i64, ServiceError> {
    let Path(raw) = parts
        .extract::<Path<String>>()
        .await
        .map_err(|e| ServiceError::Decode(e.body_text()))?;

    raw.parse::<i64>()
        .map_err(|_| ServiceError::Decode(format!("invalid user id: {}", raw)))
}

async fn json_body<T: DeserializeOwned>(request: Request) -> Result<T, ServiceError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| ServiceError::Decode(format!("failed to read request body: {}", e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| ServiceError::Decode(format!("invalid request body: {}", e)))
}

pub async fn decode_create_user_request(
    request: Request,
) -> Result<CreateUserRequest, ServiceError> {
    json_body(request).await
}

pub async fn decode_get_user_request(request: Request) -> Result<GetUserRequest, ServiceError> {
    let (mut parts, _body) = request.into_parts();
    let id = path_id(&mut parts).await?;
    Ok(GetUserRequest { id })
}

/// The path id replaces any `id` carried in the body
pub async fn decode_update_user_request(
    request: Request,
) -> Result<UpdateUserRequest, ServiceError> {
    let (mut parts, body) = request.into_parts();
    let id = path_id(&mut parts).await?;

    let mut update: UpdateUserRequest = json_body(Request::from_parts(parts, body)).await?;
    update.id = id;
    Ok(update)
}

pub async fn decode_delete_user_request(
    request: Request,
) -> Result<DeleteUserRequest, ServiceError> {
    let (mut parts, _body) = request.into_parts();
    let id = path_id(&mut parts).await?;
    Ok(DeleteUserRequest { id })
}

fn fail(span: &Span, stage: Stage, err: ServiceError) -> Response {
    let status = err.status_code();
    span.record("stage", stage.as_str());
    span.record("http.status_code", status.as_u16());
    span.record("otel.status_code", "ERROR");
    span.record("otel.status_description", field::display(&err));

    warn!(
        stage = %stage,
        status = status.as_u16(),
        error = %err,
        "Request failed"
    );

    err.into_response()
}

async fn dispatch<Req, Resp, D, Fut>(
    span: &Span,
    endpoint: &BoxEndpoint<Req, Resp>,
    decode: D,
    request: Request,
    timeout: Duration,
) -> Result<Resp, (Stage, ServiceError)>
where
    Req: Send + 'static,
    Resp: Send + 'static,
    D: FnOnce(Request) -> Fut,
    Fut: Future<Output = Result<Req, ServiceError>>,
{
    let token = authorization_token(request.headers())
        .map_err(|e| (Stage::Received, ServiceError::from(e)))?;
    span.record("stage", Stage::AuthHeaderChecked.as_str());

    let ctx = RequestContext::background()
        .with_credentials(token)
        .with_timeout(timeout);

    let decoded = decode(request)
        .await
        .map_err(|e| (Stage::AuthHeaderChecked, e))?;
    span.record("stage", Stage::Decoded.as_str());

    endpoint.call(ctx, decoded).await.map_err(|e| {
        // Credential failures come from the middleware, before the operation ran
        let stage = match e {
            ServiceError::Auth(_) => Stage::Decoded,
            _ => Stage::Authorized,
        };
        (stage, e)
    })
}

/// Run one HTTP request through `decode` and `endpoint`.
///
/// The `Authorization` header is checked before anything is decoded. Exactly
/// one response is produced: the JSON-encoded endpoint result, or the error.
pub async fn serve_endpoint<Req, Resp, D, Fut>(
    endpoint: &BoxEndpoint<Req, Resp>,
    decode: D,
    request: Request,
    timeout: Duration,
) -> Response
where
    Req: Send + 'static,
    Resp: Serialize + Send + 'static,
    D: FnOnce(Request) -> Fut,
    Fut: Future<Output = Result<Req, ServiceError>>,
{
    let path = request.uri().path().to_string();
    let span = info_span!(
        "http_request",
        otel.name = %path,
        otel.kind = "server",
        http.method = %request.method(),
        stage = Stage::Received.as_str(),
        http.status_code = field::Empty,
        otel.status_code = field::Empty,
        otel.status_description = field::Empty,
    );

    async {
        match dispatch(&span, endpoint, decode, request, timeout).await {
            Ok(response) => {
                span.record("stage", Stage::Processed.as_str());
                let response = Json(response).into_response();
                span.record("stage", Stage::Encoded.as_str());
                span.record("http.status_code", response.status().as_u16());
                debug!(path = %path, "Request served");
                span.record("stage", Stage::Sent.as_str());
                response
            }
            Err((stage, err)) => fail(&span, stage, err),
        }
    }
    .instrument(span.clone())
    .await
}
