//! Request-scoped accessors for the verified identity.
//!
//! The authentication gate stores one [`AuthToken`] in the request
//! extensions; these helpers are the read side. All of them tolerate an
//! absent token, so handlers mounted outside the gate get `None` or the
//! [`UNKNOWN_ACTOR`] sentinel rather than a panic, but absence where a
//! token is expected is logged as a wiring defect.
//!
//! Handlers can use the plain functions against
//! [`Extensions`](axum::http::Extensions) or the extractor forms
//! ([`Identity`], [`CurrentUser`], [`AuditActor`]) directly in their
//! signatures.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::Extensions;
use axum::http::request::Parts;
use tracing::{error, warn};

use super::token::{AuthToken, User};
use crate::problem::Problem;

/// Fixed audit-actor value for requests with no resolved identity.
pub const UNKNOWN_ACTOR: &str = "unknown";

/// The verified token for this request, if the authentication gate ran.
pub fn token(extensions: &Extensions) -> Option<&AuthToken> {
    let token = extensions.get::<AuthToken>();
    if token.is_none() {
        warn!("no auth token in request extensions");
    }
    token
}

/// The end user behind this request, when the token carries one.
///
/// Service-to-service requests authenticate without a user; absence of a
/// user is not absence of identity.
pub fn user(extensions: &Extensions) -> Option<&User> {
    token(extensions)?.user.as_ref()
}

/// The audit-actor string for this request: the username when an end user
/// is present, the client id otherwise.
///
/// Returns [`UNKNOWN_ACTOR`], loudly, when no token is stored at all. An
/// audit trail asking for an actor on an ungated route is a wiring defect.
pub fn audit_actor(extensions: &Extensions) -> String {
    let Some(token) = extensions.get::<AuthToken>() else {
        error!("no auth token to determine audit actor; this should never happen");
        return UNKNOWN_ACTOR.to_string();
    };
    match &token.user {
        Some(user) => user.username.clone(),
        None => token.client_id.clone(),
    }
}

// ---------------------------------------------------------------------------
// Extractor forms
// ---------------------------------------------------------------------------

/// Extractor for handlers that must run behind the authentication gate.
///
/// Rejects with the same bare `401` the gates use when no token is stored.
#[derive(Debug, Clone)]
pub struct Identity(pub AuthToken);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthToken>()
            .cloned()
            .map(Identity)
            .ok_or_else(|| {
                error!("handler expects an authenticated identity but none is stored");
                Problem::unauthorized().correlate(&parts.extensions)
            })
    }
}

/// Infallible extractor for the optional end user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(user(&parts.extensions).cloned()))
    }
}

/// Infallible extractor for the audit-actor string.
#[derive(Debug, Clone)]
pub struct AuditActor(pub String);

impl<S> FromRequestParts<S> for AuditActor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(AuditActor(audit_actor(&parts.extensions)))
    }
}
