//! The authentication and authorization gates.
//!
//! [`BearerAuthLayer`] resolves the caller's bearer credential into an
//! [`AuthToken`](super::AuthToken) and makes it available to everything
//! downstream; [`RequireScopeLayer`] guards individual routes with a scope
//! requirement. Both halt with the same bare `401` on any failure, so the
//! outside cannot tell extraction, validation and authorization apart.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::Request;
use axum::http::header::AUTHORIZATION;
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service};
use tracing::{error, warn};

use super::error::AuthError;
use super::session;
use super::token::extract_bearer;
use super::validator::TokenValidator;
use crate::problem::Problem;

/// The single client-visible outcome for every gate failure.
fn unauthorized(req: &Request) -> Response {
    Problem::unauthorized()
        .correlate(req.extensions())
        .into_response()
}

// ---------------------------------------------------------------------------
// Authentication gate
// ---------------------------------------------------------------------------

/// Tower layer that admits only requests carrying a bearer credential the
/// configured [`TokenValidator`] accepts.
///
/// On success the verified [`AuthToken`](super::AuthToken) is stored in the
/// request extensions and nothing is written to the response. On any
/// failure the request is halted with `401` before reaching the inner
/// service, and the cause is logged.
#[derive(Clone)]
pub struct BearerAuthLayer {
    validator: Arc<dyn TokenValidator>,
}

impl BearerAuthLayer {
    /// Gate requests with `validator`.
    pub fn new(validator: Arc<dyn TokenValidator>) -> Self {
        Self { validator }
    }
}

impl<S> Layer<S> for BearerAuthLayer {
    type Service = BearerAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BearerAuthService {
            inner,
            validator: self.validator.clone(),
        }
    }
}

/// Service produced by [`BearerAuthLayer`].
#[derive(Clone)]
pub struct BearerAuthService<S> {
    inner: S,
    validator: Arc<dyn TokenValidator>,
}

impl<S> Service<Request> for BearerAuthService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let validator = self.validator.clone();
        let not_ready_inner = self.inner.clone();
        let mut ready_inner = std::mem::replace(&mut self.inner, not_ready_inner);

        Box::pin(async move {
            let credential = match extract_bearer(req.headers().get(AUTHORIZATION)) {
                Ok(credential) => credential,
                Err(err) => {
                    warn!(error = %err, "rejecting request without usable credential");
                    return Ok(unauthorized(&req));
                }
            };

            // The credential borrows the request; finish with it before the
            // token is stored.
            let validated = validator.validate(credential).await;

            match validated {
                Ok(token) => {
                    req.extensions_mut().insert(token);
                    ready_inner.call(req).await
                }
                Err(err) => {
                    error!(error = %err, "failed validating token");
                    Ok(unauthorized(&req))
                }
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Authorization gate
// ---------------------------------------------------------------------------

/// Tower layer that admits only requests whose verified token shares at
/// least one scope with the route's requirement.
///
/// Must sit inside [`BearerAuthLayer`]: a request that reaches this gate
/// without a stored token is halted exactly like a scope mismatch.
#[derive(Clone)]
pub struct RequireScopeLayer {
    required: Arc<[String]>,
}

impl RequireScopeLayer {
    /// Require any one of `scopes`.
    ///
    /// An empty requirement denies every request, since no granted scope
    /// can intersect it.
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: scopes.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S> Layer<S> for RequireScopeLayer {
    type Service = RequireScopeService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequireScopeService {
            inner,
            required: self.required.clone(),
        }
    }
}

/// Service produced by [`RequireScopeLayer`].
#[derive(Clone)]
pub struct RequireScopeService<S> {
    inner: S,
    required: Arc<[String]>,
}

impl<S> Service<Request> for RequireScopeService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let required = self.required.clone();
        let not_ready_inner = self.inner.clone();
        let mut ready_inner = std::mem::replace(&mut self.inner, not_ready_inner);

        Box::pin(async move {
            let Some(token) = session::token(req.extensions()) else {
                warn!("no token found for session");
                return Ok(unauthorized(&req));
            };

            if !has_shared_scope(&token.scopes, &required) {
                let err = AuthError::ScopeMismatch;
                warn!(
                    error = %err,
                    needed = ?required,
                    provided = ?token.scopes,
                    "rejecting request"
                );
                return Ok(unauthorized(&req));
            }

            ready_inner.call(req).await
        })
    }
}

/// Does `granted` intersect `required`? One shared scope is enough.
fn has_shared_scope(granted: &[String], required: &[String]) -> bool {
    granted
        .iter()
        .any(|scope| required.iter().any(|r| r == scope))
}
