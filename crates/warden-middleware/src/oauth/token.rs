//! Verified token types and bearer-credential extraction.

use axum::http::HeaderValue;

use super::error::AuthError;

/// End user associated with a verified token.
///
/// Only present for user-initiated requests; service-to-service calls
/// authenticate with a client id alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Stable login name reported by the identity provider.
    pub username: String,
    /// Coarse-grained roles granted by the identity provider. Informational
    /// only: route authorization works on scopes, not authorities.
    pub authorities: Vec<String>,
}

/// A verified, request-scoped grant: the client (and optionally the user)
/// behind one access credential.
///
/// Constructed once per request by a [`TokenValidator`](super::TokenValidator),
/// stored in the request extensions by
/// [`BearerAuthLayer`](super::BearerAuthLayer), and dropped with the
/// request. Never persisted, never shared across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    /// End user behind the request, when there is one.
    pub user: Option<User>,
    /// Fine-grained permissions the credential was issued with.
    pub scopes: Vec<String>,
    /// Application or service that presented the credential.
    pub client_id: String,
}

/// Pull the bearer credential out of an `Authorization` header value.
///
/// The trimmed value must consist of exactly two space-separated tokens;
/// the second one is the credential. The scheme token is not inspected:
/// `Bearer` and any other scheme are treated alike, since the credential is
/// verified remotely either way. A doubled separator makes three tokens and
/// is rejected.
pub(crate) fn extract_bearer(header: Option<&HeaderValue>) -> Result<&str, AuthError> {
    let value = header
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MalformedCredential)?;

    let mut parts = value.trim().split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_scheme), Some(credential), None) => Ok(credential),
        _ => Err(AuthError::MalformedCredential),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(value: &str) -> HeaderValue {
        HeaderValue::from_str(value).unwrap()
    }

    #[test]
    fn rejects_values_that_are_not_two_tokens() {
        for bad in ["", "   ", "Bearer", "Bearer Token Something"] {
            let value = header(bad);
            assert!(extract_bearer(Some(&value)).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn rejects_a_missing_header() {
        assert!(extract_bearer(None).is_err());
    }

    #[test]
    fn returns_the_second_token_unchanged() {
        let value = header("Bearer totallyValidToken");
        assert_eq!(extract_bearer(Some(&value)).unwrap(), "totallyValidToken");
    }

    #[test]
    fn does_not_inspect_the_scheme() {
        // Any two-token shape passes extraction; the validator decides.
        let value = header("Basic BLAH");
        assert_eq!(extract_bearer(Some(&value)).unwrap(), "BLAH");
    }

    #[test]
    fn trims_surrounding_whitespace_but_not_doubled_separators() {
        let value = header("  Bearer abc  ");
        assert_eq!(extract_bearer(Some(&value)).unwrap(), "abc");

        let value = header("Bearer  abc");
        assert!(extract_bearer(Some(&value)).is_err());
    }
}
