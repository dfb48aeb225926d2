//! Warden reference server: a small resource API behind the full warden
//! middleware stack.
//!
//! Demonstrates the intended wiring order and exposes a handful of routes
//! that exercise authentication, scope authorization, the identity
//! accessors and the loopback gate:
//!
//! 1. `GET /healthz` — public liveness probe.
//! 2. `GET /debug/build` — build info, loopback peers only.
//! 3. `GET /api/v1/whoami` — echoes the verified identity.
//! 4. `GET /api/v1/reports` — additionally requires the `reporting` scope.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use warden_middleware::headers::AppVersion;
use warden_middleware::oauth::{IntrospectionConfig, IntrospectionValidator};

mod routes;

/// Upper bound on one token introspection round-trip.
const INTROSPECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Warden reference resource server.
#[derive(Parser, Debug)]
#[command(name = "warden-server", about = "Resource server behind the warden gateway")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:3200")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (controlled via RUST_LOG env var).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let provider_url =
        std::env::var("PROVIDER_URL").unwrap_or_else(|_| "http://localhost:4100".to_string());
    let provider_client_id =
        std::env::var("PROVIDER_CLIENT_ID").unwrap_or_else(|_| "warden-dev".to_string());
    let provider_client_secret = std::env::var("PROVIDER_CLIENT_SECRET")
        .unwrap_or_else(|_| "warden-dev-secret".to_string());

    let validator = Arc::new(IntrospectionValidator::new(IntrospectionConfig {
        host: provider_url.clone(),
        client_id: provider_client_id,
        client_secret: provider_client_secret,
        timeout: INTROSPECTION_TIMEOUT,
    })?);
    info!(provider = %provider_url, "token introspection configured");

    let version = AppVersion::new(env!("CARGO_PKG_VERSION"))?;
    let app = routes::router(validator, version);

    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    info!(address = %args.listen, "warden server listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
