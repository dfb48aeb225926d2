//! Correlation-id propagation and request logging.
//!
//! [`propagate`] gives every request a correlation id: the caller's
//! `X-Correlation-ID` header when present, a fresh UUIDv4 otherwise. The id
//! is stored in the request extensions, wrapped around the rest of the
//! request as a tracing span, and echoed on the response so callers can
//! quote it back. [`log_requests`] writes the one-line summary after the
//! response is produced.
//!
//! Mount `propagate` outermost; everything that logs or builds a
//! [`Problem`](crate::problem::Problem) expects the id to exist already.

use std::fmt;
use std::time::Instant;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

/// Header consulted for an inbound id and set on every response.
pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Request-scoped correlation id, stored in the request extensions by
/// [`propagate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Wrap an id produced outside the HTTP path (queue consumers, jobs).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attach a correlation id to the request and echo it on the response.
pub async fn propagate(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(CorrelationId::new(id.clone()));

    let span = info_span!("request", correlation_id = %id);
    let mut response = next.run(req).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }
    response
}

/// Log one summary line per completed request.
///
/// Server errors are logged at error level, everything else at info. Reads
/// the id stored by [`propagate`]; mounted without it the line carries an
/// empty id.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let id = req
        .extensions()
        .get::<CorrelationId>()
        .map(|id| id.as_str().to_owned())
        .unwrap_or_default();

    let start = Instant::now();
    let response = next.run(req).await;
    let latency = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        error!(
            %method,
            %path,
            status = status.as_u16(),
            latency_ms = latency.as_millis() as u64,
            correlation_id = %id,
            "request failed"
        );
    } else {
        info!(
            %method,
            %path,
            status = status.as_u16(),
            latency_ms = latency.as_millis() as u64,
            correlation_id = %id,
            "request completed"
        );
    }

    response
}
