/// Outbound identity-provider operations
///
/// The system performs exactly one outbound call against the identity
/// provider: setting a user's tenant role in the provider's externally
/// visible metadata, so downstream authorization checks observe the role
/// without a database lookup.
///
/// The call is an absolute set (not a delta), which makes it idempotent:
/// re-running a membership resolution that already assigned the role is
/// safe under at-least-once delivery.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::models::user::Role;

/// Error type for identity-provider calls
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("Identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider rejected the request
    #[error("Identity provider rejected the request: {status}")]
    Rejected {
        /// HTTP status returned by the provider
        status: u16,
    },

    /// The provider client could not be constructed
    #[error("Invalid identity provider configuration: {0}")]
    Configuration(String),
}

/// The outbound boundary to the identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Propagates a tenant role into the provider's user metadata
    ///
    /// Must be idempotent: assigning the same role twice is a no-op at the
    /// provider.
    async fn assign_role(&self, identity_id: &str, role: Role) -> Result<(), IdentityError>;
}

/// HTTP implementation of the identity-provider boundary
///
/// Talks to the provider's management API with a bearer key. Every request
/// is bounded by the configured timeout; a timeout surfaces as a transient
/// [`IdentityError::Transport`] for the caller to retry at its own level.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpIdentityProvider {
    /// Creates a new provider client
    ///
    /// # Arguments
    ///
    /// * `base_url` - Management API base, e.g. "https://api.idp.example.com"
    /// * `api_key` - Management API key
    /// * `timeout` - Per-request timeout applied to every call
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IdentityError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn assign_role(&self, identity_id: &str, role: Role) -> Result<(), IdentityError> {
        let url = format!("{}/v1/users/{}/metadata", self.base_url, identity_id);

        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "role": role.as_str() }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IdentityError::Rejected {
                status: response.status().as_u16(),
            });
        }

        debug!(identity_id, role = role.as_str(), "Propagated role to identity provider");
        Ok(())
    }
}

/// No-op provider for deployments without a metadata sink, and for tests
///
/// Accepts every assignment and records it only in the debug log.
#[derive(Debug, Clone, Default)]
pub struct NullIdentityProvider;

#[async_trait]
impl IdentityProvider for NullIdentityProvider {
    async fn assign_role(&self, identity_id: &str, role: Role) -> Result<(), IdentityError> {
        debug!(identity_id, role = role.as_str(), "Role assignment skipped (null provider)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_provider_accepts_assignments() {
        let provider = NullIdentityProvider;
        let result = provider.assign_role("idp_2f9a", Role::AgencyAdmin).await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_http_provider_normalizes_base_url() {
        let provider = HttpIdentityProvider::new(
            "https://api.idp.example.com/",
            "sk_test",
            Duration::from_secs(5),
        )
        .expect("client should build");

        assert_eq!(provider.base_url, "https://api.idp.example.com");
    }

    #[test]
    fn test_rejected_error_display() {
        let err = IdentityError::Rejected { status: 422 };
        assert!(err.to_string().contains("422"));
    }
}
