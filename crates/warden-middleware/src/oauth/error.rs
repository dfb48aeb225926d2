//! Failure taxonomy for credential extraction and validation.
//!
//! [`AuthError`] deliberately does NOT implement
//! [`axum::response::IntoResponse`]: the variants exist for server-side
//! diagnostics, and every one of them is answered with the same bare `401`
//! so callers cannot probe which step failed. The gates log the variant and
//! send [`Problem::unauthorized`](crate::problem::Problem::unauthorized).

/// Why a credential could not be authenticated or authorized.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The `Authorization` header was absent, unreadable, or not exactly
    /// two space-separated tokens.
    #[error("missing or malformed Authorization header")]
    MalformedCredential,

    /// The identity provider could not be reached at the transport level
    /// (connection refused, DNS failure, timeout).
    #[error("identity provider unreachable: {0}")]
    ProviderUnreachable(#[source] reqwest::Error),

    /// The identity provider answered with a non-200 status.
    #[error("identity provider rejected the credential (status {status})")]
    ProviderRejected {
        /// HTTP status the provider answered with.
        status: u16,
    },

    /// The provider answered 200 but named no client: the credential is
    /// unverifiable despite the transport-level success.
    #[error("credential resolved to no client identity")]
    TokenNotVerifiable,

    /// The provider's response body did not decode into the expected shape.
    #[error("malformed identity provider response: {0}")]
    MalformedProviderResponse(#[source] reqwest::Error),

    /// The verified token shares no scope with the route's requirement.
    #[error("token does not share any required scope")]
    ScopeMismatch,
}
