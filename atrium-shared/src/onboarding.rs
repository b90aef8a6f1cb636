/// Invitation resolution at session establishment
///
/// When an authenticated identity loads the dashboard for the first time in
/// a session, the system answers one question: which agency does this
/// principal belong to, and in what role? The answer may require consuming
/// a pending invitation and provisioning the local user record.
///
/// # Concurrency
///
/// Two resolver calls can race on the same email (two tabs, a retried page
/// load). All coordination is pushed down to the store: the conditional
/// delete in [`Invitation::consume_pending`] succeeds for exactly one
/// caller, and the email uniqueness constraint on `users` makes the insert
/// idempotent. The loser of a race observes "already resolved" and returns
/// the same binding — never a duplicate user, never an error.
///
/// # Atomicity
///
/// Invitation consumption, user creation, the "Joined" activity entry, and
/// the outbound role-metadata propagation form one unit. The first three
/// run in a single transaction; the outbound call happens before commit, so
/// a provider failure aborts the transaction and no partial state persists.
/// The outbound assignment is an absolute set and therefore safe to repeat
/// when the caller retries the whole unit.

use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::identity::provider::{IdentityError, IdentityProvider};
use crate::identity::VerifiedIdentity;
use crate::models::invitation::Invitation;
use crate::models::notification::{CreateNotification, Notification};
use crate::models::user::{CreateUser, Role, User};

/// The resolved tenant membership of an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TenantBinding {
    /// Agency the identity belongs to
    pub agency_id: Uuid,

    /// Role the identity holds within the agency
    pub role: Role,
}

/// Error type for membership resolution
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    /// Transient store failure; the caller retries the whole page load
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The outbound role propagation failed; nothing was persisted
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// Resolves the tenant membership of a verified identity
///
/// Returns the identity's binding, consuming a pending invitation and
/// provisioning the local user when one exists. Returns `None` for
/// identities with no invitation and no bound user — the caller sends
/// those to the agency-creation flow.
///
/// An invitation carrying the `agency_owner` role is never consumed here:
/// owners are provisioned through agency creation, and this call is an
/// explicit no-op returning `None` for that case.
pub async fn resolve_membership(
    pool: &PgPool,
    provider: &dyn IdentityProvider,
    identity: &VerifiedIdentity,
) -> Result<Option<TenantBinding>, OnboardingError> {
    let Some(invitation) = Invitation::find_pending_by_email(pool, &identity.email).await? else {
        return existing_binding(pool, &identity.email).await;
    };

    if invitation.role == Role::AgencyOwner {
        warn!(
            email = %identity.email,
            agency_id = %invitation.agency_id,
            "Pending invitation carries the owner role; leaving it unconsumed"
        );
        return Ok(None);
    }

    let mut tx = pool.begin().await?;

    // The conditional delete is the only race arbiter: whoever deletes the
    // pending row provisions the user.
    let Some(consumed) = Invitation::consume_pending(&mut *tx, &identity.email).await? else {
        tx.rollback().await?;
        return existing_binding(pool, &identity.email).await;
    };

    let user = match User::create_if_absent(
        &mut *tx,
        CreateUser {
            identity_id: identity.id.clone(),
            email: identity.email.clone(),
            name: identity.display_name(),
            avatar_url: identity.avatar_url.clone(),
            role: consumed.role,
            agency_id: Some(consumed.agency_id),
        },
    )
    .await?
    {
        Some(user) => user,
        // Email already provisioned (e.g. an earlier run committed the user
        // but a new invitation was issued since); keep the existing row.
        None => User::find_by_email(&mut *tx, &identity.email)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?,
    };

    Notification::create(
        &mut *tx,
        CreateNotification {
            notification: format!("{} Joined", user.name),
            user_id: user.id,
            agency_id: consumed.agency_id,
            sub_account_id: None,
        },
    )
    .await?;

    // Propagate the role before committing: if the provider call fails the
    // transaction aborts and the invitation stays pending for a retry.
    provider.assign_role(&identity.id, consumed.role).await?;

    tx.commit().await?;

    info!(
        email = %identity.email,
        agency_id = %consumed.agency_id,
        role = consumed.role.as_str(),
        "Invitation accepted"
    );

    Ok(Some(TenantBinding {
        agency_id: consumed.agency_id,
        role: consumed.role,
    }))
}

/// Looks up the binding of an already-provisioned identity, if any
async fn existing_binding(
    pool: &PgPool,
    email: &str,
) -> Result<Option<TenantBinding>, OnboardingError> {
    let user = User::find_by_email(pool, email).await?;

    Ok(user.and_then(|user| {
        user.agency_id.map(|agency_id| TenantBinding {
            agency_id,
            role: user.role,
        })
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_binding_serializes_role_as_snake_case() {
        let binding = TenantBinding {
            agency_id: Uuid::nil(),
            role: Role::AgencyAdmin,
        };

        let json = serde_json::to_value(&binding).unwrap();
        assert_eq!(json["role"], "agency_admin");
    }

    // The resolution flow itself (consume-once, race behavior, owner no-op)
    // requires a live database and is covered in tests/onboarding_tests.rs.
}
