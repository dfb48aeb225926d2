//! Loopback-only gate for diagnostic routes.
//!
//! Build info, runtime variables and similar diagnostics must not be
//! reachable from off the box. [`require_loopback`] halts any request
//! whose peer address is not a loopback IP with a `403` problem payload.
//!
//! Peer addresses come from [`ConnectInfo`]; serve the router with
//! [`into_make_service_with_connect_info`][mksvc] or the gate fails
//! closed.
//!
//! [mksvc]: axum::Router::into_make_service_with_connect_info

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use crate::problem::Problem;

/// Admit only requests arriving over the loopback interface.
pub async fn require_loopback(req: Request, next: Next) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    match peer {
        Some(peer) if peer.ip().is_loopback() => next.run(req).await,
        Some(peer) => {
            warn!(%peer, "diagnostic route requested from remote host");
            forbidden(&req)
        }
        None => {
            error!("no peer address on request; serve with connect info to use the loopback gate");
            forbidden(&req)
        }
    }
}

fn forbidden(req: &Request) -> Response {
    Problem::forbidden("diagnostic access is forbidden")
        .correlate(req.extensions())
        .into_response()
}
