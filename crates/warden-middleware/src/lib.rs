#![deny(missing_docs)]

//! # Warden Middleware
//!
//! Request authentication and authorization for axum services, together
//! with the request decorators the gates cooperate with.
//!
//! ## Request path
//!
//! ```text
//! correlation::propagate        tag the request with a correlation id
//! └── correlation::log_requests one summary line per request
//!     └── headers::secure / headers::version
//!         └── oauth::BearerAuthLayer      credential -> verified AuthToken
//!             └── oauth::RequireScopeLayer  per-route scope requirement
//!                 └── handler   reads identity via oauth::session
//! ```
//!
//! Every failure inside the gates is answered with the same bare `401`
//! carrying the uniform [`Problem`] payload; the reason is logged on the
//! server side only.
//!
//! ## Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`oauth`] | Bearer authentication gate, scope gate, token validation, session accessors |
//! | [`correlation`] | Correlation-id propagation and request logging |
//! | [`headers`] | Version, cache-control and security response headers |
//! | [`loopback`] | Loopback-only gate for diagnostic routes |
//! | [`problem`] | Uniform JSON error payload |

pub mod correlation;
pub mod headers;
pub mod loopback;
pub mod oauth;
pub mod problem;

// Re-export the public surface at the crate root for convenience.
// Downstream crates can use `warden_middleware::BearerAuthLayer` directly.
pub use correlation::*;
pub use headers::*;
pub use loopback::*;
pub use oauth::*;
pub use problem::*;
