//! Response-header decorators.
//!
//! The stock operational headers a service behind a browser or a proxy
//! wants: a version marker, cache suppression for sensitive payloads, and
//! the usual security set. All three are plain middleware functions for
//! [`axum::middleware::from_fn`] and
//! [`from_fn_with_state`](axum::middleware::from_fn_with_state).

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, EXPIRES, InvalidHeaderValue, LAST_MODIFIED,
    X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION,
};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

/// Response header carrying the application version.
pub const VERSION_HEADER: &str = "x-version";

/// Application version advertised by [`version`]. Wrap it in
/// [`from_fn_with_state`](axum::middleware::from_fn_with_state):
///
/// ```ignore
/// router.layer(middleware::from_fn_with_state(
///     AppVersion::new(env!("CARGO_PKG_VERSION"))?,
///     headers::version,
/// ))
/// ```
#[derive(Debug, Clone)]
pub struct AppVersion(HeaderValue);

impl AppVersion {
    /// Build from the version string; fails when the string cannot be
    /// carried in a header.
    pub fn new(version: &str) -> Result<Self, InvalidHeaderValue> {
        HeaderValue::from_str(version).map(Self)
    }
}

/// Stamp the configured version on every response.
pub async fn version(State(version): State<AppVersion>, req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    response.headers_mut().insert(VERSION_HEADER, version.0);
    response
}

/// Forbid client and intermediary caching of the response.
pub async fn no_cache(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, max-age=0, must-revalidate"),
    );
    headers.insert(
        EXPIRES,
        HeaderValue::from_static("Thu, 01 Jan 1970 00:00:00 GMT"),
    );
    if let Ok(now) = HeaderValue::from_str(&http_date_now()) {
        headers.insert(LAST_MODIFIED, now);
    }
    response
}

/// Standard security headers for browser-facing responses.
///
/// Transport security (HSTS) is left to the TLS-terminating proxy.
pub async fn secure(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));
    response
}

/// RFC 7231 HTTP-date for the current instant.
fn http_date_now() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::routing::get;
    use axum::{Router, middleware};
    use axum_test::TestServer;

    async fn ok() -> &'static str {
        "ok"
    }

    #[tokio::test]
    async fn version_is_advertised() {
        let app = Router::new().route("/", get(ok)).layer(
            middleware::from_fn_with_state(AppVersion::new("1.2.3").unwrap(), version),
        );
        let server = TestServer::new(app).unwrap();

        let response = server.get("/").await;

        response.assert_status_ok();
        assert_eq!(response.header(VERSION_HEADER), "1.2.3");
    }

    #[tokio::test]
    async fn no_cache_suppresses_caching() {
        let app = Router::new()
            .route("/", get(ok))
            .layer(middleware::from_fn(no_cache));
        let server = TestServer::new(app).unwrap();

        let response = server.get("/").await;

        response.assert_status_ok();
        assert_eq!(
            response.header("cache-control"),
            "no-cache, no-store, max-age=0, must-revalidate"
        );
        assert_eq!(
            response.header("expires"),
            "Thu, 01 Jan 1970 00:00:00 GMT"
        );
        let last_modified = response.header("last-modified");
        assert!(last_modified.to_str().unwrap().ends_with("GMT"));
    }

    #[tokio::test]
    async fn secure_sets_the_browser_headers() {
        let app = Router::new()
            .route("/", get(ok))
            .layer(middleware::from_fn(secure));
        let server = TestServer::new(app).unwrap();

        let response = server.get("/").await;

        response.assert_status_ok();
        assert_eq!(response.header("access-control-allow-origin"), "*");
        assert_eq!(response.header("x-frame-options"), "DENY");
        assert_eq!(response.header("x-content-type-options"), "nosniff");
        assert_eq!(response.header("x-xss-protection"), "1; mode=block");
    }

    #[test]
    fn http_dates_use_the_imf_fixdate_shape() {
        let date = http_date_now();
        // e.g. "Fri, 22 Aug 2026 10:15:00 GMT"
        assert_eq!(date.len(), 29);
        assert!(date.ends_with(" GMT"));
        assert_eq!(&date[3..5], ", ");
    }
}
