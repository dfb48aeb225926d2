//! Bearer-token authentication and scope-based authorization.
//!
//! The entry point is [`BearerAuthLayer`]: it pulls the bearer credential
//! out of the `Authorization` header, resolves it to an [`AuthToken`]
//! through a [`TokenValidator`], and stores the token in the request
//! extensions for the rest of the request's lifetime. [`RequireScopeLayer`]
//! is then attached to individual routes to demand that the verified token
//! carries one of the route's scopes. Handlers read the resolved identity
//! through the [`session`] accessors.
//!
//! Whether a request failed extraction, validation or a scope check is
//! deliberately not observable from the outside: the gates log the cause
//! and answer with an identical bare `401`.

mod error;
mod gate;
mod token;
mod validator;

pub mod session;

pub use error::AuthError;
pub use gate::{BearerAuthLayer, BearerAuthService, RequireScopeLayer, RequireScopeService};
pub use token::{AuthToken, User};
pub use validator::{IntrospectionConfig, IntrospectionValidator, TokenValidator};
