use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, debug, error, info_span, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

use super::AppState;
use super::session::Session;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Wrap each request in a span keyed by a fresh request id and log the
/// outcome. Failures carry the `ErrorReport` a handler attached; the span
/// records whether the caller held the admin session.
pub async fn trace_requests(
    State(state): State<AppState>,
    session: Session,
    request: Request<Body>,
    next: Next,
) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let admin = state.gate.permits(session.identity().as_deref());
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        admin,
    );
    let mut response = next.run(request).instrument(span.clone()).await;

    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis();
    let report = response.extensions_mut().remove::<ErrorReport>();

    span.in_scope(|| {
        if !(status.is_client_error() || status.is_server_error()) {
            debug!(
                target = "quire::http::response",
                status = status.as_u16(),
                elapsed_ms,
                "request served"
            );
            return;
        }

        let (source, messages) = match report {
            Some(report) => (report.source, report.messages),
            None => ("unknown", Vec::new()),
        };
        let detail = messages.first().map(String::as_str).unwrap_or("-");

        if status.is_server_error() {
            error!(
                target = "quire::http::response",
                status = status.as_u16(),
                elapsed_ms,
                source,
                detail,
                chain = ?messages,
                "request failed"
            );
        } else {
            warn!(
                target = "quire::http::response",
                status = status.as_u16(),
                elapsed_ms,
                source,
                detail,
                "client request error"
            );
        }
    });

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
