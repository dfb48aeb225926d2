//! Credential validation strategies.
//!
//! [`TokenValidator`] is the capability the authentication gate is built
//! over; [`IntrospectionValidator`] is the production implementation,
//! asking a remote OAuth2 provider whether a credential is currently good
//! and what it grants. Tests substitute static validators to keep policy
//! logic off the network.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};

use super::error::AuthError;
use super::token::{AuthToken, User};

/// Strategy for resolving an opaque bearer credential into a verified
/// [`AuthToken`].
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Resolve `credential`, returning the verified token or the reason it
    /// could not be verified.
    async fn validate(&self, credential: &str) -> Result<AuthToken, AuthError>;
}

// ---------------------------------------------------------------------------
// Remote introspection
// ---------------------------------------------------------------------------

/// Connection settings for [`IntrospectionValidator`].
#[derive(Debug, Clone)]
pub struct IntrospectionConfig {
    /// Base URL of the identity provider, without a trailing slash
    /// (e.g. `http://localhost:4100`).
    pub host: String,
    /// Client id this service presents to the provider (HTTP Basic).
    pub client_id: String,
    /// Client secret paired with `client_id`.
    pub client_secret: String,
    /// Upper bound on one introspection round-trip. A hung provider must
    /// not pin request tasks indefinitely.
    pub timeout: Duration,
}

/// Wire shape of the provider's check-token endpoint. Absent fields decode
/// as empty rather than failing the whole response.
#[derive(Debug, Deserialize)]
struct CheckTokenResponse {
    #[serde(default)]
    user_name: String,
    #[serde(default)]
    client_id: String,
    #[serde(default)]
    authorities: Vec<String>,
    #[serde(default)]
    scope: Vec<String>,
}

/// Production [`TokenValidator`]: verifies credentials against a remote
/// OAuth2 provider's `/oauth/check_token` endpoint.
///
/// The validator authenticates itself to the provider with HTTP Basic
/// credentials; the credential under test travels as a query parameter.
/// One HTTP client is built per validator and reused for every check.
pub struct IntrospectionValidator {
    config: IntrospectionConfig,
    client: reqwest::Client,
}

impl IntrospectionValidator {
    /// Build the validator and its HTTP client.
    pub fn new(config: IntrospectionConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }

    /// One provider round-trip, decoded but not yet judged for validity.
    async fn check_token(&self, credential: &str) -> Result<CheckTokenResponse, AuthError> {
        let url = format!("{}/oauth/check_token", self.config.host);
        let response = self
            .client
            .get(&url)
            .query(&[("token", credential)])
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(AuthError::ProviderUnreachable)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            error!(status = status.as_u16(), "non-200 status from identity provider");
            return Err(AuthError::ProviderRejected {
                status: status.as_u16(),
            });
        }

        response
            .json::<CheckTokenResponse>()
            .await
            .map_err(AuthError::MalformedProviderResponse)
    }
}

#[async_trait]
impl TokenValidator for IntrospectionValidator {
    async fn validate(&self, credential: &str) -> Result<AuthToken, AuthError> {
        let checked = self.check_token(credential).await.map_err(|err| {
            debug!(error = %err, "could not validate access token");
            err
        })?;

        if checked.client_id.is_empty() {
            debug!("provider answered 200 without a client id");
            return Err(AuthError::TokenNotVerifiable);
        }

        let user = (!checked.user_name.is_empty()).then(|| User {
            username: checked.user_name,
            authorities: checked.authorities,
        });

        Ok(AuthToken {
            user,
            scopes: checked.scope,
            client_id: checked.client_id,
        })
    }
}
