//! Router assembly and the reference handlers.

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router, middleware};
use serde::Serialize;
use warden_middleware::correlation;
use warden_middleware::headers::{self, AppVersion};
use warden_middleware::loopback;
use warden_middleware::oauth::session::{AuditActor, CurrentUser, Identity};
use warden_middleware::oauth::{BearerAuthLayer, RequireScopeLayer, TokenValidator};

/// Scope required to read the reports route.
const REPORTS_SCOPE: &str = "reporting";

/// Assemble the full router: public probes, loopback-guarded diagnostics
/// and the authenticated `/api/v1` surface.
pub fn router(validator: Arc<dyn TokenValidator>, version: AppVersion) -> Router {
    let api = Router::new()
        .route("/whoami", get(whoami))
        .route(
            "/reports",
            get(reports).route_layer(RequireScopeLayer::new([REPORTS_SCOPE])),
        )
        .layer(BearerAuthLayer::new(validator))
        .layer(middleware::from_fn(headers::no_cache));

    let debug = Router::new()
        .route("/build", get(build_info))
        .layer(middleware::from_fn(loopback::require_loopback));

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/debug", debug)
        .nest("/api/v1", api)
        .layer(middleware::from_fn_with_state(version, headers::version))
        .layer(middleware::from_fn(headers::secure))
        .layer(middleware::from_fn(correlation::log_requests))
        .layer(middleware::from_fn(correlation::propagate))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Liveness probe.
async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Serialize)]
struct BuildInfo {
    name: &'static str,
    version: &'static str,
}

/// Build information; reachable from the box itself only.
async fn build_info() -> Json<BuildInfo> {
    Json(BuildInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct WhoamiResponse {
    actor: String,
    client_id: String,
    username: Option<String>,
    scopes: Vec<String>,
}

/// Echo the verified identity back to the caller.
async fn whoami(
    Identity(token): Identity,
    CurrentUser(user): CurrentUser,
    AuditActor(actor): AuditActor,
) -> Json<WhoamiResponse> {
    Json(WhoamiResponse {
        actor,
        client_id: token.client_id,
        username: user.map(|u| u.username),
        scopes: token.scopes,
    })
}

#[derive(Serialize)]
struct ReportsResponse {
    requested_by: String,
    reports: Vec<&'static str>,
}

/// Scope-guarded resource: needs the `reporting` scope.
async fn reports(AuditActor(actor): AuditActor) -> Json<ReportsResponse> {
    Json(ReportsResponse {
        requested_by: actor,
        reports: vec!["daily-activity", "scope-usage"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::SocketAddr;

    use async_trait::async_trait;
    use axum::extract::{ConnectInfo, Request, State};
    use axum::http::HeaderValue;
    use axum::http::header::AUTHORIZATION;
    use axum::middleware::Next;
    use axum::response::Response;
    use axum_test::TestServer;
    use serde_json::{Value, json};
    use warden_middleware::oauth::{AuthError, AuthToken, User};

    const USER_CREDENTIAL: &str = "userToken";
    const SERVICE_CREDENTIAL: &str = "serviceToken";

    /// Validator double with a fixed credential table.
    struct TableValidator;

    #[async_trait]
    impl TokenValidator for TableValidator {
        async fn validate(&self, credential: &str) -> Result<AuthToken, AuthError> {
            match credential {
                USER_CREDENTIAL => Ok(AuthToken {
                    user: Some(User {
                        username: "alice".to_string(),
                        authorities: vec!["ROLE_USER".to_string()],
                    }),
                    scopes: vec!["mobile".to_string(), "read".to_string()],
                    client_id: "clientapp".to_string(),
                }),
                SERVICE_CREDENTIAL => Ok(AuthToken {
                    user: None,
                    scopes: vec!["service".to_string(), "reporting".to_string()],
                    client_id: "reportd".to_string(),
                }),
                _ => Err(AuthError::ProviderRejected { status: 400 }),
            }
        }
    }

    fn test_server() -> TestServer {
        let app = router(
            Arc::new(TableValidator),
            AppVersion::new("0.0.0-test").unwrap(),
        );
        TestServer::new(app).unwrap()
    }

    fn bearer(credential: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {credential}")).unwrap()
    }

    async fn with_peer(State(addr): State<SocketAddr>, mut req: Request, next: Next) -> Response {
        req.extensions_mut().insert(ConnectInfo(addr));
        next.run(req).await
    }

    fn test_server_with_peer(addr: SocketAddr) -> TestServer {
        let app = router(
            Arc::new(TableValidator),
            AppVersion::new("0.0.0-test").unwrap(),
        )
        .layer(middleware::from_fn_with_state(addr, with_peer));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn healthz_is_public() {
        let server = test_server();

        let response = server.get("/healthz").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn responses_carry_the_operational_headers() {
        let server = test_server();

        let response = server.get("/healthz").await;

        assert_eq!(response.header("x-version"), "0.0.0-test");
        assert_eq!(response.header("x-frame-options"), "DENY");
        assert!(!response.header("x-correlation-id").is_empty());
    }

    #[tokio::test]
    async fn whoami_requires_a_credential() {
        let server = test_server();

        let response = server.get("/api/v1/whoami").await;

        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body["title"], "unauthorized");
        // The correlation id ties the rejection to the logs.
        assert_eq!(body["id"], response.header("x-correlation-id").to_str().unwrap());
    }

    #[tokio::test]
    async fn whoami_echoes_the_end_user() {
        let server = test_server();

        let response = server
            .get("/api/v1/whoami")
            .add_header(AUTHORIZATION, bearer(USER_CREDENTIAL))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(
            body,
            json!({
                "actor": "alice",
                "client_id": "clientapp",
                "username": "alice",
                "scopes": ["mobile", "read"],
            })
        );
        // Authenticated responses must not be cached.
        assert_eq!(
            response.header("cache-control"),
            "no-cache, no-store, max-age=0, must-revalidate"
        );
    }

    #[tokio::test]
    async fn whoami_echoes_a_service_identity() {
        let server = test_server();

        let response = server
            .get("/api/v1/whoami")
            .add_header(AUTHORIZATION, bearer(SERVICE_CREDENTIAL))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["actor"], "reportd");
        assert_eq!(body["username"], Value::Null);
    }

    #[tokio::test]
    async fn reports_needs_the_reporting_scope() {
        let server = test_server();

        let denied = server
            .get("/api/v1/reports")
            .add_header(AUTHORIZATION, bearer(USER_CREDENTIAL))
            .await;
        denied.assert_status_unauthorized();

        let allowed = server
            .get("/api/v1/reports")
            .add_header(AUTHORIZATION, bearer(SERVICE_CREDENTIAL))
            .await;
        allowed.assert_status_ok();
        let body: Value = allowed.json();
        assert_eq!(body["requested_by"], "reportd");
    }

    #[tokio::test]
    async fn debug_routes_are_loopback_only() {
        let local = test_server_with_peer("127.0.0.1:54000".parse().unwrap());
        let response = local.get("/debug/build").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["name"], "warden-server");

        let remote = test_server_with_peer("203.0.113.7:54000".parse().unwrap());
        remote.get("/debug/build").await.assert_status_forbidden();
    }
}
