//! Uniform JSON error payload.
//!
//! Every halted request, whether from a gate, the loopback guard or a
//! handler, answers with the same JSON object:
//!
//! ```json
//! { "id": "…", "title": "…", "code": "…", "detail": "…", "meta": { … } }
//! ```
//!
//! `id` carries the correlation id and ties the response to the
//! server-side log line; `code`, `detail` and `meta` are optional and
//! omitted when unset. [`Problem`] implements
//! [`IntoResponse`], so handlers return `Result<_, Problem>` and
//! middleware halts with `problem.into_response()`.

use std::collections::BTreeMap;

use axum::Json;
use axum::http::{Extensions, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::correlation::CorrelationId;

/// Wire shape of the payload.
#[derive(Debug, Serialize)]
struct ProblemBody {
    id: String,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<BTreeMap<String, String>>,
}

/// A request-halting outcome: an HTTP status plus the uniform payload.
///
/// Build with one of the status constructors, then chain the optional
/// setters:
///
/// ```
/// use warden_middleware::problem::Problem;
///
/// let problem = Problem::bad_request("unknown report id")
///     .with_code("UNKNOWN_REPORT")
///     .with_meta("report", "42");
/// ```
#[derive(Debug)]
pub struct Problem {
    status: StatusCode,
    title: String,
    code: Option<String>,
    detail: Option<String>,
    meta: Option<BTreeMap<String, String>>,
    correlation_id: Option<String>,
}

impl Problem {
    /// A problem with an arbitrary status.
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        Self {
            status,
            title: title.into(),
            code: None,
            detail: None,
            meta: None,
            correlation_id: None,
        }
    }

    /// `401` with the fixed title every authentication and authorization
    /// failure shares. Carries no reason on purpose.
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized")
    }

    /// `403` for access postures outside the credential flow, like the
    /// loopback gate.
    pub fn forbidden(title: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, title)
    }

    /// `400` for malformed client input.
    pub fn bad_request(title: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, title)
    }

    /// `500` for faults the caller cannot repair.
    pub fn internal(title: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, title)
    }

    /// Attach the machine-readable error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach the human-oriented detail text.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Attach one meta entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Take the correlation id from the request extensions, if one is
    /// stored. Without it the `id` field is sent empty.
    pub fn correlate(mut self, extensions: &Extensions) -> Self {
        self.correlation_id = extensions
            .get::<CorrelationId>()
            .map(|id| id.as_str().to_owned());
        self
    }

    /// Status this problem halts with.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let body = ProblemBody {
            id: self.correlation_id.unwrap_or_default(),
            title: self.title,
            code: self.code,
            detail: self.detail,
            meta: self.meta,
        };
        (self.status, Json(body)).into_response()
    }
}
