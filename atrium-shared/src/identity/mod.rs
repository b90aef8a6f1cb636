/// Identity-provider boundary
///
/// Atrium does not manage credentials itself; authentication is delegated to
/// an external identity provider. This module is the typed boundary to that
/// collaborator:
///
/// - [`VerifiedIdentity`]: the verified principal a request carries after
///   session-token validation
/// - [`token`]: validation (and test issuance) of provider session tokens
/// - [`provider`]: the one outbound operation the system performs against
///   the provider — propagating a user's tenant role into externally
///   visible metadata
/// - [`authorization`]: role checks of a verified identity against a target
///   agency

pub mod authorization;
pub mod provider;
pub mod token;

use serde::{Deserialize, Serialize};

/// A verified, currently authenticated principal
///
/// Constructed only from a successfully validated session token, so holders
/// can rely on the identity having been authenticated by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    /// Stable unique identifier at the identity provider
    pub id: String,

    /// Verified email address
    pub email: String,

    /// Given name, when the provider knows it
    pub first_name: Option<String>,

    /// Family name, when the provider knows it
    pub last_name: Option<String>,

    /// Avatar URL, when the provider knows it
    pub avatar_url: Option<String>,
}

impl VerifiedIdentity {
    /// Human-readable display name
    ///
    /// Joins the known name parts; falls back to the email address when the
    /// provider supplied no name at all.
    pub fn display_name(&self) -> String {
        let name = match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => String::new(),
        };

        if name.trim().is_empty() {
            self.email.clone()
        } else {
            name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(first: Option<&str>, last: Option<&str>) -> VerifiedIdentity {
        VerifiedIdentity {
            id: "idp_7k2m".to_string(),
            email: "jane@example.com".to_string(),
            first_name: first.map(str::to_string),
            last_name: last.map(str::to_string),
            avatar_url: None,
        }
    }

    #[test]
    fn test_display_name_joins_parts() {
        assert_eq!(identity(Some("Jane"), Some("Doe")).display_name(), "Jane Doe");
    }

    #[test]
    fn test_display_name_single_part() {
        assert_eq!(identity(Some("Jane"), None).display_name(), "Jane");
        assert_eq!(identity(None, Some("Doe")).display_name(), "Doe");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        assert_eq!(identity(None, None).display_name(), "jane@example.com");
    }
}
