use axum::{
    Router,
    extract::Query,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Deserialize;
use serde_json::{Value, json};

// Client credentials the check_token endpoint itself is protected with.
// These match the warden-server dev defaults.
const CLIENT_ID: &str = "warden-dev";
const CLIENT_SECRET: &str = "warden-dev-secret";

#[tokio::main]
async fn main() {
    let app = Router::new().route("/oauth/check_token", get(check_token));

    let listener = tokio::net::TcpListener::bind("0.0.0.0:4100").await.unwrap();
    println!("MOCK-IDP: Listening on http://localhost:4100");
    println!("MOCK-IDP: known tokens: demo-user-token, demo-service-token");
    axum::serve(listener, app).await.unwrap();
}

// --- Endpoints ---

#[derive(Deserialize)]
struct CheckTokenParams {
    #[serde(default)]
    token: String,
}

async fn check_token(headers: HeaderMap, Query(params): Query<CheckTokenParams>) -> Response {
    if !basic_auth_ok(&headers) {
        println!("MOCK-IDP: rejected check_token call with bad client credentials");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    println!("MOCK-IDP: check_token for '{}'", params.token);

    match lookup(&params.token) {
        Some(body) => Json(body).into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_token" })),
        )
            .into_response(),
    }
}

// --- Fixed credential table ---

fn lookup(token: &str) -> Option<Value> {
    match token {
        // An end user logged in through the web app.
        "demo-user-token" => Some(json!({
            "user_name": "alice",
            "client_id": "webapp",
            "authorities": ["ROLE_USER"],
            "scope": ["mobile", "read"],
        })),
        // A backend service talking service-to-service.
        "demo-service-token" => Some(json!({
            "client_id": "reportd",
            "scope": ["service", "reporting"],
        })),
        _ => None,
    }
}

fn basic_auth_ok(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return false;
    };
    let Ok(value) = value.to_str() else {
        return false;
    };
    let Some(encoded) = value.strip_prefix("Basic ") else {
        return false;
    };
    let Ok(decoded) = STANDARD.decode(encoded) else {
        return false;
    };
    let Ok(decoded) = String::from_utf8(decoded) else {
        return false;
    };
    decoded == format!("{CLIENT_ID}:{CLIENT_SECRET}")
}
