/// Authorization checks for verified identities
///
/// Maps a [`VerifiedIdentity`] onto its local user record and enforces
/// role requirements against a target agency. Handlers call these before
/// mutating tenant state.
///
/// # Example
///
/// ```no_run
/// use atrium_shared::identity::{authorization::require_agency_role, VerifiedIdentity};
/// use atrium_shared::models::user::Role;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, agency_id: Uuid, identity: VerifiedIdentity) -> Result<(), Box<dyn std::error::Error>> {
/// // Only agency admins (or owners) may manage invitations
/// let acting_user = require_agency_role(&pool, agency_id, &identity, Role::AgencyAdmin).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use super::VerifiedIdentity;
use crate::models::user::{Role, User};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// The identity has no local user record yet
    #[error("Identity is not provisioned")]
    NotProvisioned,

    /// The user is not a member of the target agency
    #[error("Not a member of agency {0}")]
    NotMember(Uuid),

    /// The user's role does not meet the requirement
    #[error("Insufficient permissions: requires {required:?}, has {actual:?}")]
    InsufficientRole {
        /// Minimum role the operation demands
        required: Role,
        /// Role the user actually holds
        actual: Role,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Requires the identity to hold at least `required` within `agency_id`
///
/// Returns the acting user's record on success so handlers don't have to
/// look it up again.
///
/// # Errors
///
/// - [`AuthzError::NotProvisioned`] when no local user exists for the identity
/// - [`AuthzError::NotMember`] when the user belongs to a different agency (or none)
/// - [`AuthzError::InsufficientRole`] when the role hierarchy check fails
pub async fn require_agency_role(
    pool: &PgPool,
    agency_id: Uuid,
    identity: &VerifiedIdentity,
    required: Role,
) -> Result<User, AuthzError> {
    let user = User::find_by_email(pool, &identity.email)
        .await?
        .ok_or(AuthzError::NotProvisioned)?;

    if user.agency_id != Some(agency_id) {
        return Err(AuthzError::NotMember(agency_id));
    }

    if !user.role.has_permission(&required) {
        return Err(AuthzError::InsufficientRole {
            required,
            actual: user.role,
        });
    }

    Ok(user)
}

/// Requires the identity to be a member of `agency_id` with any role
pub async fn require_membership(
    pool: &PgPool,
    agency_id: Uuid,
    identity: &VerifiedIdentity,
) -> Result<User, AuthzError> {
    require_agency_role(pool, agency_id, identity, Role::SubaccountGuest).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authz_error_display() {
        let err = AuthzError::NotProvisioned;
        assert!(err.to_string().contains("not provisioned"));

        let err = AuthzError::InsufficientRole {
            required: Role::AgencyAdmin,
            actual: Role::SubaccountUser,
        };
        assert!(err.to_string().contains("AgencyAdmin"));

        let err = AuthzError::NotMember(Uuid::nil());
        assert!(err.to_string().contains("Not a member"));
    }

    // Role lookups against a live database are exercised in the integration
    // suite in tests/.
}
