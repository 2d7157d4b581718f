//! Request id propagation and failure logging.

use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
}

/// Tag each request with a fresh id and echo it back in `x-request-id`.
pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let header = HeaderValue::from_str(&request_id).ok();
    request
        .extensions_mut()
        .insert(RequestContext { request_id });

    let mut response = next.run(request).await;
    if let Some(value) = header {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Log every 4xx/5xx with the `ErrorReport` the handler attached. 5xx logs
/// at error, 4xx at warn.
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();
    let start = Instant::now();

    let mut response = next.run(request).await;
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let elapsed_ms = start.elapsed().as_millis();
    let report = response
        .extensions_mut()
        .remove::<ErrorReport>()
        .unwrap_or_else(|| ErrorReport::note("unknown", "no diagnostic available"));

    if status.is_server_error() {
        error!(
            target = "blotter::http::response",
            status = status.as_u16(),
            method = %method,
            path = %path,
            request_id = %request_id,
            elapsed_ms,
            source = report.source,
            detail = report.detail(),
            chain = ?report.chain,
            "request failed"
        );
    } else {
        warn!(
            target = "blotter::http::response",
            status = status.as_u16(),
            method = %method,
            path = %path,
            request_id = %request_id,
            elapsed_ms,
            source = report.source,
            detail = report.detail(),
            "request rejected"
        );
    }

    response
}
