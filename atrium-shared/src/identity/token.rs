/// Session-token validation
///
/// The identity provider issues HS256-signed session tokens carrying the
/// verified identity claims. This module validates them (signature, expiry,
/// issuer) and converts the claims into a [`VerifiedIdentity`].
///
/// Token *issuance* also lives here, but only because the development
/// tooling and the test suites need to mint tokens with the shared secret;
/// in production the provider is the sole issuer.
///
/// # Example
///
/// ```
/// use atrium_shared::identity::token::{issue_session_token, validate_session_token, SessionClaims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = SessionClaims::new(
///     "idp_2f9a".to_string(),
///     "jane@example.com".to_string(),
///     "atrium-idp",
/// );
/// let token = issue_session_token(&claims, "shared-secret-at-least-32-bytes!")?;
///
/// let identity = validate_session_token(&token, "shared-secret-at-least-32-bytes!", "atrium-idp")?;
/// assert_eq!(identity.email, "jane@example.com");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::VerifiedIdentity;

/// Error type for session-token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Session token has expired")]
    Expired,

    /// Token was issued by an unexpected issuer
    #[error("Invalid token issuer")]
    InvalidIssuer,

    /// Signature, format, or claim validation failed
    #[error("Invalid session token: {0}")]
    Invalid(String),
}

/// Claims carried by a provider session token
///
/// Standard claims (`sub`, `iss`, `iat`, `exp`) plus the identity attributes
/// the provider asserts about the principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject - the provider's user id
    pub sub: String,

    /// Issuer - the configured identity provider
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Verified email address
    pub email: String,

    /// Given name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,

    /// Family name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,

    /// Avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

impl SessionClaims {
    /// Creates new claims with the default 24h session lifetime
    pub fn new(identity_id: String, email: String, issuer: &str) -> Self {
        Self::with_lifetime(identity_id, email, issuer, Duration::hours(24))
    }

    /// Creates new claims with a custom lifetime
    pub fn with_lifetime(
        identity_id: String,
        email: String,
        issuer: &str,
        lifetime: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            sub: identity_id,
            iss: issuer.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            email,
            given_name: None,
            family_name: None,
            picture: None,
        }
    }
}

impl From<SessionClaims> for VerifiedIdentity {
    fn from(claims: SessionClaims) -> Self {
        VerifiedIdentity {
            id: claims.sub,
            email: claims.email,
            first_name: claims.given_name,
            last_name: claims.family_name,
            avatar_url: claims.picture,
        }
    }
}

/// Signs a session token (development tooling and tests)
pub fn issue_session_token(claims: &SessionClaims, secret: &str) -> Result<String, TokenError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {e}")))
}

/// Validates a session token and extracts the verified identity
///
/// Verifies the signature, expiration, and issuer.
///
/// # Errors
///
/// - [`TokenError::Expired`] when the token is past its `exp`
/// - [`TokenError::InvalidIssuer`] when `iss` doesn't match the configured issuer
/// - [`TokenError::Invalid`] for any other signature/format failure
pub fn validate_session_token(
    token: &str,
    secret: &str,
    issuer: &str,
) -> Result<VerifiedIdentity, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    validation.validate_exp = true;

    let token_data = decode::<SessionClaims>(token, &key, &validation).map_err(|e| {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            jsonwebtoken::errors::ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
            _ => TokenError::Invalid(format!("Token validation failed: {e}")),
        }
    })?;

    Ok(token_data.claims.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";
    const ISSUER: &str = "atrium-idp";

    fn claims() -> SessionClaims {
        let mut claims = SessionClaims::new(
            "idp_2f9a".to_string(),
            "jane@example.com".to_string(),
            ISSUER,
        );
        claims.given_name = Some("Jane".to_string());
        claims.family_name = Some("Doe".to_string());
        claims
    }

    #[test]
    fn test_issue_and_validate_roundtrip() {
        let token = issue_session_token(&claims(), SECRET).expect("should sign");
        let identity = validate_session_token(&token, SECRET, ISSUER).expect("should validate");

        assert_eq!(identity.id, "idp_2f9a");
        assert_eq!(identity.email, "jane@example.com");
        assert_eq!(identity.display_name(), "Jane Doe");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let token = issue_session_token(&claims(), SECRET).expect("should sign");
        assert!(validate_session_token(&token, "some-other-secret", ISSUER).is_err());
    }

    #[test]
    fn test_validate_with_wrong_issuer() {
        let token = issue_session_token(&claims(), SECRET).expect("should sign");
        let result = validate_session_token(&token, SECRET, "someone-else");

        assert!(matches!(result.unwrap_err(), TokenError::InvalidIssuer));
    }

    #[test]
    fn test_validate_expired_token() {
        let expired = SessionClaims::with_lifetime(
            "idp_2f9a".to_string(),
            "jane@example.com".to_string(),
            ISSUER,
            chrono::Duration::seconds(-3600),
        );
        let token = issue_session_token(&expired, SECRET).expect("should sign");
        let result = validate_session_token(&token, SECRET, ISSUER);

        assert!(matches!(result.unwrap_err(), TokenError::Expired));
    }

    #[test]
    fn test_optional_name_claims_survive_roundtrip() {
        let mut bare = SessionClaims::new(
            "idp_9x".to_string(),
            "no-name@example.com".to_string(),
            ISSUER,
        );
        bare.picture = Some("https://img.example.com/a.png".to_string());

        let token = issue_session_token(&bare, SECRET).unwrap();
        let identity = validate_session_token(&token, SECRET, ISSUER).unwrap();

        assert_eq!(identity.first_name, None);
        assert_eq!(identity.avatar_url.as_deref(), Some("https://img.example.com/a.png"));
        assert_eq!(identity.display_name(), "no-name@example.com");
    }
}
