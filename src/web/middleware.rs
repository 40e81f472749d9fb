//! HTTP middleware

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};

use super::rate_limit::client_ip;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Use the caller's request id when it is a sane token, otherwise mint one
fn request_id(request: &Request) -> String {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|id| {
            !id.is_empty()
                && id.len() <= 64
                && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
        .map(str::to_owned)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Wraps every request in a span carrying the request id and client address,
/// logs the outcome and echoes the id back in `x-request-id`
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = request_id(&request);
    let client = client_ip(&request);
    let method = request.method().clone();
    // Query strings carry image URLs; keep them out of the logs
    let path = request.uri().path().to_owned();

    let span = info_span!("request", request_id = %request_id, client = %client);
    let mut response = next.run(request).instrument(span.clone()).await;

    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis();
    span.in_scope(|| {
        if status.is_client_error() || status.is_server_error() {
            warn!(%method, %path, status = status.as_u16(), elapsed_ms, "Request failed");
        } else {
            info!(%method, %path, status = status.as_u16(), elapsed_ms, "Request served");
        }
    });

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::get, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/ok", get(|| async { "fine" }))
            .route("/teapot", get(|| async { StatusCode::IM_A_TEAPOT }))
            .layer(axum::middleware::from_fn(request_logging_middleware))
    }

    async fn call(uri: &str, request_id: Option<&str>) -> Response {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(id) = request_id {
            builder = builder.header("x-request-id", id);
        }
        app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_generated_id_is_returned() {
        let response = call("/ok", None).await;
        let id = response.headers()["x-request-id"].to_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());

        let failed = call("/teapot", None).await;
        assert_eq!(failed.status(), StatusCode::IM_A_TEAPOT);
        assert!(failed.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_caller_id_is_kept_when_valid() {
        let response = call("/ok", Some("trace-42")).await;
        assert_eq!(response.headers()["x-request-id"], "trace-42");

        let response = call("/ok", Some("bad id; injected")).await;
        assert_ne!(response.headers()["x-request-id"], "bad id; injected");
    }
}
